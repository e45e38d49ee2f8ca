pub mod ajax_shop;
