pub mod status_catalog;
