pub mod binop_registry;
