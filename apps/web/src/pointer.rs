use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

use crate::state::GridCell;

/// Call `callback` with the DOM grid cell under each click.
///
/// The DOM backend draws one element per row holding one `<span>` per cell,
/// so the clicked span's position among its siblings is its column.
pub fn on_click<F>(mut callback: F) -> Result<(), JsValue>
where
    F: FnMut(GridCell) + 'static,
{
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("document unavailable"))?;

    let listener = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(
        move |event: web_sys::MouseEvent| {
            let cell = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|target| grid_cell(&target));
            if let Some(cell) = cell {
                callback(cell);
            }
        },
    );

    document.add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())?;
    // The listener lives as long as the page.
    listener.forget();
    Ok(())
}

fn grid_cell(target: &Element) -> Option<GridCell> {
    let cell = target.closest("span").ok().flatten()?;
    let row = cell.parent_element()?;
    let grid = row.parent_element()?;

    let (col, cols) = child_index(&row, &cell)?;
    let (row, rows) = child_index(&grid, &row)?;
    Some(GridCell {
        col,
        row,
        cols,
        rows,
    })
}

/// Index of `child` among `parent`'s element children, and their count.
fn child_index(parent: &Element, child: &Element) -> Option<(u32, u32)> {
    let children = parent.children();
    let count = children.length();
    (0..count)
        .find(|&index| {
            children
                .item(index)
                .is_some_and(|item| item.is_same_node(Some(child.as_ref())))
        })
        .map(|index| (index, count))
}
