use crate::handle::ObjectKind;
use crate::proxy::{Proxy, ProxyKind};

pub struct DomNodeKind;

impl ProxyKind for DomNodeKind {
    const KIND: ObjectKind = ObjectKind::DomNode;
}

pub type DomNode = Proxy<DomNodeKind>;

impl Proxy<DomNodeKind> {
    /// Upper-case element name, empty for non-element nodes.
    pub fn tag_name(&self) -> String {
        self.engine().dom_node_tag_name(self.handle())
    }

    pub fn is_editable(&self) -> bool {
        self.engine().dom_node_is_editable(self.handle())
    }
}
