pub mod pptx;
pub mod template_store;
