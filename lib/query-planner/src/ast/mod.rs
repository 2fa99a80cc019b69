pub mod field_path;
pub mod hash;
pub mod merge;
pub mod operation;
pub mod selection_item;
pub mod selection_path;
pub mod selection_set;
pub mod type_node;
pub mod value;
