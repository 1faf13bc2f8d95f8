pub mod db_init;
pub mod document_repository;
