use crate::error::Result;
use crate::parity::read_parity_header;
use std::fs;
use std::path::Path;

/// Display information about a parity file
pub fn show_info(path: &Path) -> Result<String> {
    let header = read_parity_header(path)?;
    let file_size = fs::metadata(path)?.len();

    let chunk_bytes = header.chunk_bytes();
    let record_bytes = header.record_bytes();
    let header_bytes = header.to_bytes()?.len();
    let expected_size = (4 + 4 + header_bytes as u64)
        .saturating_add((record_bytes as u64).saturating_mul(header.chunk_count as u64));
    let overhead = if chunk_bytes == 0 {
        0.0
    } else {
        100.0 * record_bytes as f64 / chunk_bytes as f64
    };

    let mut output = String::new();

    output.push_str("Elective Parity File Information\n");
    output.push_str("================================\n\n");

    output.push_str(&format!("File: {}\n", path.display()));
    output.push_str(&format!("Actual size: {}\n", format_size(file_size)));
    output.push_str(&format!("Version: {}\n", header.version));
    output.push_str(&format!("Key check: {}\n", header.key_check));
    output.push('\n');

    output.push_str("Geometry:\n");
    output.push_str(&format!("  Symbol width: {} ({} bits)\n", header.width, header.width.bits()));
    output.push_str(&format!(
        "  Symbols per chunk: {} ({} bytes)\n",
        header.block_symbols, chunk_bytes
    ));
    output.push_str(&format!("  Redundancy symbols: {}\n", header.redundancy));
    output.push_str(&format!("  Auxiliary symbols: {}\n", header.auxiliary));
    output.push_str(&format!("  Scan stride: {}\n", header.stride));
    output.push_str(&format!(
        "  Longest repairable burst: {} bytes per chunk\n",
        header.redundancy * header.width.bytes()
    ));
    output.push('\n');

    output.push_str("Protected Data:\n");
    output.push_str(&format!("  Original size: {}\n", format_size(header.original_size)));
    output.push_str(&format!(
        "  Tail chunk: {} bytes padded\n",
        (chunk_bytes - (header.original_size % chunk_bytes as u64) as usize) % chunk_bytes
    ));
    output.push_str(&format!("  Chunks: {}\n", header.chunk_count));
    output.push_str(&format!("  Record size: {} bytes\n", record_bytes));
    output.push_str(&format!("  Parity overhead: {:.1}%\n", overhead));
    output.push('\n');

    if file_size != expected_size {
        output.push_str(&format!(
            "Warning: expected {} bytes for {} records, file has {}\n",
            expected_size, header.chunk_count, file_size
        ));
    }

    Ok(output)
}

const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::protect::{protect_file, ProtectOptions};
    use crate::cli::KeySource;
    use tempfile::tempdir;

    #[test]
    fn test_show_info() {
        let dir = tempdir().unwrap();
        let input_path = dir.path().join("input.txt");
        let parity_path = dir.path().join("input.epf");
        std::fs::write(&input_path, vec![3u8; 2000]).unwrap();

        let options = ProtectOptions {
            key: KeySource::Password("secret".into()),
            ..Default::default()
        };
        protect_file(&input_path, &parity_path, &options).unwrap();

        let info = show_info(&parity_path).unwrap();
        assert!(info.contains("Version: 1"));
        assert!(info.contains("Symbol width: u64 (64 bits)"));
        assert!(info.contains("Symbols per chunk: 64 (512 bytes)"));
        assert!(info.contains("Chunks: 4"));
        assert!(info.contains("Record size: 40 bytes"));
        assert!(info.contains("Tail chunk: 48 bytes padded"));
        assert!(!info.contains("Warning"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1048576), "1.0 MB");
        assert_eq!(format_size(3 << 40), "3.0 TB");
        assert_eq!(format_size(u64::MAX), "16777216.0 TB");
    }
}
