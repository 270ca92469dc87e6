use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

/// Stream a fully closed file through gzip into its `.gz` sibling.
/// The original is left in place; the caller decides when to remove it.
pub fn compress_file(path: &Path) -> io::Result<PathBuf> {
    let gz_path = gz_sibling(path);
    let input = File::open(path)?;
    let output = File::create(&gz_path)?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut BufReader::new(input), &mut encoder)?;
    let output = encoder.finish()?;
    output.sync_data()?;
    Ok(gz_path)
}

/// `/var/log/app.log` -> `/var/log/app.log.gz`
pub fn gz_sibling(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".gz");
    PathBuf::from(name)
}
