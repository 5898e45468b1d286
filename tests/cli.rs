use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn elective(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_elective"))
        .args(args)
        .output()
        .expect("failed to run elective")
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 131 + 7) % 256) as u8).collect()
}

#[test]
fn test_version() {
    let out = elective(&["--version"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("elective "));
    assert!(stdout.contains("parity format v1"));
}

#[test]
fn test_encrypt_decrypt_round_trip() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.bin");
    let cipher = dir.path().join("plain.enc");
    let restored = dir.path().join("plain.out");
    std::fs::write(&plain, sample(1500)).unwrap();

    for mode in ["long", "short"] {
        let out = elective(&[
            "encrypt", "--password", "PASSWORD", "--width", "32", "--mode", mode,
            arg(&plain), arg(&cipher),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        let encrypted = std::fs::read(&cipher).unwrap();
        assert_ne!(&encrypted[..64], &sample(1500)[..64]);

        let out = elective(&[
            "decrypt", "--password", "PASSWORD", "--width", "32", "--mode", mode,
            arg(&cipher), arg(&restored),
        ]);
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        assert_eq!(std::fs::read(&restored).unwrap(), sample(1500));
    }
}

#[test]
fn test_encrypt_requires_key() {
    let dir = tempdir().unwrap();
    let plain = dir.path().join("plain.bin");
    std::fs::write(&plain, b"no key").unwrap();
    let out = elective(&["encrypt", arg(&plain), arg(&dir.path().join("x"))]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Key required"));
}

#[test]
fn test_keygen_then_encrypt_with_key_file() {
    let dir = tempdir().unwrap();
    let key = dir.path().join("key.bin");
    let plain = dir.path().join("plain.bin");
    let cipher = dir.path().join("plain.enc");
    let restored = dir.path().join("plain.out");
    std::fs::write(&plain, sample(300)).unwrap();

    assert!(elective(&["keygen", arg(&key)]).status.success());
    assert_eq!(std::fs::read(&key).unwrap().len(), 32);
    assert!(!elective(&["keygen", arg(&key)]).status.success());

    let out = elective(&["encrypt", "--key-file", arg(&key), arg(&plain), arg(&cipher)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let out = elective(&["decrypt", "--key-file", arg(&key), arg(&cipher), arg(&restored)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(std::fs::read(&restored).unwrap(), sample(300));
}

#[test]
fn test_hash_prints_one_line_per_block() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input.bin");
    std::fs::write(&input, sample(512 * 2 + 1)).unwrap();

    let out = elective(&["hash", "--password", "PASSWORD", arg(&input)]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.lines().count(), 3);

    let out = elective(&["hash", "--mode", "feedback", arg(&input)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn test_protect_corrupt_recover() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.bin");
    let original = sample(128 * 3);
    std::fs::write(&data, &original).unwrap();

    let out = elective(&[
        "protect", "--password", "PASSWORD", "--width", "32", "--block-symbols", "32",
        "--redundancy", "4", "--auxiliary", "2", arg(&data),
    ]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let parity = dir.path().join("data.bin.epf");
    assert!(parity.exists());

    let info = elective(&["info", arg(&parity)]);
    assert!(info.status.success());
    let info = String::from_utf8_lossy(&info.stdout);
    assert!(info.contains("Chunks: 3"));
    assert!(info.contains("Redundancy symbols: 4"));

    let mut damaged = original.clone();
    for b in &mut damaged[128 + 40..128 + 48] {
        *b ^= 0xFF;
    }
    std::fs::write(&data, &damaged).unwrap();

    let out = elective(&["recover", "--password", "PASSWORD", "--dry-run", arg(&data)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(std::fs::read(&data).unwrap(), damaged);

    let out = elective(&["recover", "--password", "PASSWORD", "--json", arg(&data)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["written"], true);
    assert_eq!(report["chunks"][1]["status"]["status"], "repaired");
    assert_eq!(report["chunks"][1]["status"]["offset"], 8);
    assert_eq!(std::fs::read(&data).unwrap(), original);
}

#[test]
fn test_recover_reports_unrecoverable() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data.bin");
    let parity = dir.path().join("data.parity");
    let original = sample(256);
    std::fs::write(&data, &original).unwrap();

    let out = elective(&[
        "protect", "--password", "PASSWORD", "--width", "32", "--block-symbols", "32",
        "--redundancy", "4", "--auxiliary", "2", arg(&data), arg(&parity),
    ]);
    assert!(out.status.success());

    let mut damaged = original.clone();
    for i in [4usize, 40, 80, 120] {
        damaged[i] ^= 0x55;
    }
    std::fs::write(&data, &damaged).unwrap();

    let out = elective(&["recover", "--password", "PASSWORD", arg(&data), arg(&parity)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("Unrecoverable chunk 0"));

    let out = elective(&["recover", "--password", "wrong", arg(&data), arg(&parity)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid key"));
}
