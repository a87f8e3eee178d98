pub mod http_client;
pub mod http_render;
pub mod in_memory;
pub mod supabase_storage;
pub mod supabase_store;
