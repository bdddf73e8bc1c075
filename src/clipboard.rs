use arboard::Clipboard;
use tracing::info;
use crate::error::SinkError;

/// Puts the serialized moves on the system clipboard
pub fn copy_to_clipboard(text: &str) -> Result<(), SinkError> {
    let mut clipboard = Clipboard::new()?;
    clipboard.set_text(text.to_string())?;
    info!(bytes = text.len(), "Copied moves to clipboard");
    Ok(())
}
