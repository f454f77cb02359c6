use std::cell::RefCell;
use std::rc::Rc;

/// Something an app renders into.
pub trait Mount {
    /// Remove everything previously rendered.
    fn clear(&mut self);
}

impl<T> Mount for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self)
    }
}

impl Mount for String {
    fn clear(&mut self) {
        String::clear(self)
    }
}

/// Shared roots, so effects created while rendering can hold on to them.
impl<M: Mount> Mount for Rc<RefCell<M>> {
    fn clear(&mut self) {
        self.borrow_mut().clear()
    }
}

/// Clear `root` (or a fresh default root) and render into it.
pub fn render_app<M: Mount + Default>(render: impl FnOnce(&mut M), root: Option<M>) -> M {
    let mut root = root.unwrap_or_default();
    root.clear();
    render(&mut root);
    root
}
