mod audio_adapter;
mod composite_file_loader;
mod file_loader_factory;
mod image_adapter;
mod pdf_adapter;
mod plain_text_adapter;
mod recursive_character_splitter;
mod text_sanitizer;

pub use audio_adapter::AudioAdapter;
pub use composite_file_loader::CompositeFileLoader;
pub use file_loader_factory::create_file_loader;
pub use image_adapter::ImageAdapter;
pub use pdf_adapter::PdfAdapter;
pub use plain_text_adapter::PlainTextAdapter;
pub use recursive_character_splitter::RecursiveCharacterSplitter;
pub use text_sanitizer::sanitize_extracted_text;
