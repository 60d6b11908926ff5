pub mod unit_content_cache;
