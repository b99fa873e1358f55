use pdfchat::domain::{Chunk, ContentType, MessageRole};

#[test]
fn given_known_mime_types_when_parsing_then_maps_to_content_types() {
    assert_eq!(ContentType::from_mime("application/pdf"), Some(ContentType::Pdf));
    assert_eq!(
        ContentType::from_mime("text/plain; charset=utf-8"),
        Some(ContentType::Text)
    );
    assert_eq!(ContentType::from_mime("text/markdown"), Some(ContentType::Text));
    assert_eq!(ContentType::from_mime("IMAGE/JPEG"), Some(ContentType::Image));
    assert_eq!(ContentType::from_mime("audio/wav"), Some(ContentType::Audio));
}

#[test]
fn given_unknown_mime_type_when_parsing_then_returns_none() {
    assert_eq!(ContentType::from_mime("application/zip"), None);
    assert_eq!(ContentType::from_mime("application/octet-stream"), None);
}

#[test]
fn given_file_extensions_when_parsing_then_maps_to_content_types() {
    assert_eq!(ContentType::from_filename("paper.PDF"), Some(ContentType::Pdf));
    assert_eq!(ContentType::from_filename("notes.md"), Some(ContentType::Text));
    assert_eq!(ContentType::from_filename("photo.webp"), Some(ContentType::Image));
    assert_eq!(ContentType::from_filename("talk.m4a"), Some(ContentType::Audio));
    assert_eq!(ContentType::from_filename("no_extension"), None);
}

#[test]
fn given_role_names_when_parsing_then_accepts_any_case() {
    assert_eq!("USER".parse::<MessageRole>(), Ok(MessageRole::User));
    assert_eq!("assistant".parse::<MessageRole>(), Ok(MessageRole::Assistant));
    assert!("moderator".parse::<MessageRole>().is_err());
}

#[test]
fn given_role_when_displayed_then_uses_wire_name() {
    assert_eq!(MessageRole::System.to_string(), "system");
}

#[test]
fn given_chunk_when_created_then_keeps_position() {
    let chunk = Chunk::new(3, "text".to_string(), 120);

    assert_eq!(chunk.index, 3);
    assert_eq!(chunk.offset, 120);
}
