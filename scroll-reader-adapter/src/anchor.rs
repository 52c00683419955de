use core::fmt;

use scroll_reader::{GestureController, ItemProvider, Viewport};

/// A reading position expressed by page identity instead of a raw offset.
///
/// Raw offsets go stale as soon as pages are inserted above the reading position or their
/// heights change; an anchor survives that, as long as the page's key is still present.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageAnchor<K> {
    pub key: K,
    /// How far the viewport top sits below the page's top edge, in content px.
    pub offset_in_page: i32,
}

impl<K: fmt::Debug> fmt::Debug for PageAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageAnchor")
            .field("key", &self.key)
            .field("offset_in_page", &self.offset_in_page)
            .finish()
    }
}

/// Captures an anchor for the first visible page.
///
/// Returns `None` when nothing is laid out yet.
pub fn capture_page_anchor<H, K>(viewport: &Viewport<H, K>) -> Option<PageAnchor<K>>
where
    K: Clone + PartialEq,
{
    let index = viewport.first_visible_index()?;
    let item = viewport.laid_out(index)?;
    Some(PageAnchor {
        key: item.key.clone(),
        offset_in_page: -item.top,
    })
}

/// Requests the offset that puts the anchored page back under the viewport top.
///
/// The page is located by key in the *current* data set of `provider`. Takes effect on the next
/// layout pass. Returns `false` when the key is gone.
pub fn apply_page_anchor<H, K, P>(
    controller: &mut GestureController<H, K>,
    provider: &P,
    anchor: &PageAnchor<K>,
) -> bool
where
    K: Clone + PartialEq,
    P: ItemProvider<Handle = H, Key = K>,
{
    let Some(index) = (0..provider.count()).find(|&i| provider.item_at(i).key == anchor.key)
    else {
        return false;
    };
    let Some(start) = controller.viewport().offset_of(index, provider) else {
        return false;
    };
    if !controller.set_selection(index, provider) {
        return false;
    }
    controller.restore_offset(start + anchor.offset_in_page);
    true
}
