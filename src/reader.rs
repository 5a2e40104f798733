use anyhow::Context;
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Tests if the stream underlying the [BufReader] `reader` is gzipped or
/// not by examining the first 2 bytes for the magic header. This
/// function *requires*, but does not check, that none of the stream has
/// yet been consumed. It will fill the buffer to examine the first two
/// bytes, but will not consume them.
///
/// Notes: implementation taken from
/// <https://github.com/zaeleus/noodles/blob/ba1b34ce22e72c2df277b20ce4c5c7b75d75a199/noodles-util/src/variant/reader/builder.rs#L131>
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    Ok(src.get(..2) == Some(&GZIP_MAGIC_NUMBER))
}

/// Opens the GFF3 file at `file_path` for line-oriented reading. This
/// function will automatically determine if the provided path points to
/// a gzip compressed or an uncompressed file, and will return the
/// appropriate reader accordingly.
///
/// Failure to open or probe the file is the one irrecoverable error of
/// a validation run and is returned as an [anyhow::Error]; everything
/// downstream is reported, not raised.
pub fn open_gff3<P: AsRef<Path>>(file_path: P) -> anyhow::Result<Box<dyn BufRead>> {
    let file = File::open(file_path.as_ref())
        .with_context(|| format!("failed opening {}", file_path.as_ref().display()))?;
    let mut inner_rdr = BufReader::new(file);
    if is_gzipped(&mut inner_rdr)? {
        info!("auto-detected gzipped file - reading via decompression");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(inner_rdr))))
    } else {
        Ok(Box::new(inner_rdr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_is_gzipped_detects_magic_bytes() {
        let mut gz = Cursor::new(vec![0x1f, 0x8b, 0x08, 0x00]);
        assert!(is_gzipped(&mut gz).unwrap());

        let mut plain = Cursor::new(b"chr1\ttest\tgene".to_vec());
        assert!(!is_gzipped(&mut plain).unwrap());

        let mut empty = Cursor::new(Vec::new());
        assert!(!is_gzipped(&mut empty).unwrap());
    }
}
