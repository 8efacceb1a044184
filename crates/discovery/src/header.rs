//! Minimal FITS primary-header reader.
//!
//! Simspec inputs are FITS files, but the dispatcher only needs two scalar
//! keywords from the primary header: `FLAVOR` and `EXPID`. A FITS header is
//! plain ASCII - 80-byte cards packed into 2880-byte blocks, terminated by
//! an `END` card - so the reader below never touches a data unit.
//!
//! `write_stub` is the writer counterpart used to generate fixture files.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use contracts::{ExpId, Flavor, PipelineError};

/// One FITS block = 36 cards x 80 bytes
const BLOCK_SIZE: usize = 2880;
const CARD_SIZE: usize = 80;

/// Headers are expected within the first few blocks; anything beyond this
/// is a malformed file as far as the dispatcher is concerned.
const MAX_HEADER_BLOCKS: usize = 16;

/// The two scalar metadata fields embedded in a simspec file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposureHeader {
    pub flavor: Flavor,
    pub expid: ExpId,
}

/// Read `FLAVOR` and `EXPID` from the primary header of `path`.
pub fn read_header(path: &Path) -> Result<ExposureHeader, PipelineError> {
    let display = path.display().to_string();

    let mut file = File::open(path)
        .map_err(|e| PipelineError::header_read(&display, e.to_string()))?;
    let mut buf = Vec::with_capacity(BLOCK_SIZE);
    Read::by_ref(&mut file)
        .take((MAX_HEADER_BLOCKS * BLOCK_SIZE) as u64)
        .read_to_end(&mut buf)
        .map_err(|e| PipelineError::header_read(&display, e.to_string()))?;

    if buf.len() < BLOCK_SIZE {
        return Err(PipelineError::header_read(
            &display,
            format!("truncated header: {} bytes", buf.len()),
        ));
    }

    let mut flavor: Option<Flavor> = None;
    let mut expid: Option<ExpId> = None;
    let mut saw_end = false;

    for card in buf.chunks_exact(CARD_SIZE) {
        let keyword = card_keyword(card);
        match keyword {
            "END" => {
                saw_end = true;
                break;
            }
            "FLAVOR" => {
                let value = string_value(card).ok_or_else(|| {
                    PipelineError::header_read(&display, "FLAVOR is not a string value")
                })?;
                // Flavor parsing is infallible; unknown labels become Other
                flavor = Some(value.parse().unwrap_or(Flavor::Other(value)));
            }
            "EXPID" => {
                let value = integer_value(card).ok_or_else(|| {
                    PipelineError::header_read(&display, "EXPID is not an integer value")
                })?;
                let value = u32::try_from(value).map_err(|_| {
                    PipelineError::header_read(&display, format!("EXPID out of range: {value}"))
                })?;
                expid = Some(ExpId(value));
            }
            _ => {}
        }
    }

    if !saw_end {
        return Err(PipelineError::header_read(&display, "no END card found"));
    }

    let flavor = flavor.ok_or_else(|| PipelineError::HeaderKeywordMissing {
        keyword: "FLAVOR".into(),
        path: display.clone(),
    })?;
    let expid = expid.ok_or_else(|| PipelineError::HeaderKeywordMissing {
        keyword: "EXPID".into(),
        path: display,
    })?;

    Ok(ExposureHeader { flavor, expid })
}

/// Keyword field: bytes 0..8, space padded
fn card_keyword(card: &[u8]) -> &str {
    std::str::from_utf8(&card[..8]).unwrap_or("").trim_end()
}

/// Value field of a card with the `= ` value indicator, comment stripped
fn value_field(card: &[u8]) -> Option<&str> {
    if &card[8..10] != b"= " {
        return None;
    }
    std::str::from_utf8(&card[10..]).ok()
}

/// Quoted string value: `'science '` -> `science`
fn string_value(card: &[u8]) -> Option<String> {
    let field = value_field(card)?.trim_start();
    let rest = field.strip_prefix('\'')?;
    let end = rest.find('\'')?;
    Some(rest[..end].trim_end().to_string())
}

/// Integer value, ignoring any trailing `/ comment`
fn integer_value(card: &[u8]) -> Option<i64> {
    let field = value_field(card)?;
    let value = field.split('/').next()?.trim();
    value.parse().ok()
}

/// Write a minimal single-block FITS header carrying the given flavor and
/// expid. Fixture generator for tests and dry-run rehearsal trees; real
/// inputs come from the upstream simulator.
pub fn write_stub(path: &Path, flavor: &Flavor, expid: ExpId) -> Result<(), PipelineError> {
    let mut block = Vec::with_capacity(BLOCK_SIZE);

    push_card(&mut block, "SIMPLE  =                    T");
    push_card(&mut block, "BITPIX  =                    8");
    push_card(&mut block, "NAXIS   =                    0");
    push_card(
        &mut block,
        &format!("FLAVOR  = '{:<8}'           / exposure flavor", flavor),
    );
    push_card(
        &mut block,
        &format!("EXPID   = {:>20} / exposure id", expid.0),
    );
    push_card(&mut block, "END");
    block.resize(BLOCK_SIZE, b' ');

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(&block)?;
    Ok(())
}

fn push_card(block: &mut Vec<u8>, text: &str) {
    let mut card = text.as_bytes().to_vec();
    card.resize(CARD_SIZE, b' ');
    block.extend_from_slice(&card);
}
