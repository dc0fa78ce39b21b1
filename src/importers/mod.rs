// Import module - broker statement CSV parser

pub mod statement_csv;

use anyhow::{anyhow, Context, Result};
use encoding_rs::ISO_8859_15;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub use statement_csv::{parse_statement_content, ParsedStatement};

/// Import a statement file (.csv or .txt).
///
/// Decodes UTF-8 first and falls back to ISO-8859-15; broker exports often
/// arrive with the original encoding intact but the accents already mangled
/// upstream, so both paths must parse.
pub fn import_statement<P: AsRef<Path>>(file_path: P) -> Result<ParsedStatement> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension"))?
        .to_lowercase();

    info!("Importing statement file: {:?} (type: {})", path, extension);

    match extension.as_str() {
        "csv" | "txt" => {}
        _ => {
            return Err(anyhow!(
                "Unsupported file format: {}. Supported formats: .csv, .txt",
                extension
            ))
        }
    }

    let bytes = fs::read(path).context("Failed to read statement file")?;
    let content = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Statement is not valid UTF-8, decoding as ISO-8859-15");
            let (decoded, _, _) = ISO_8859_15.decode(e.as_bytes());
            decoded.into_owned()
        }
    };

    let parsed = parse_statement_content(&content)
        .with_context(|| format!("Failed to parse statement {:?}", path))?;

    info!(
        "Imported {} snapshots and {} movements from statement",
        parsed.snapshots.len(),
        parsed.movements.len()
    );

    Ok(parsed)
}
