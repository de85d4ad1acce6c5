//! Generate command implementation

use std::{fs::File, io};

use anyhow::{Context, Result};
use topkeys_testkit::data_gen;

pub fn run(count: usize, seed: u64, distinct: bool, output: Option<String>) -> Result<()> {
    match &output {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
            generate(file, count, seed, distinct)
                .with_context(|| format!("Failed to write {path}"))?;
            log::info!("wrote {count} records to {path} (seed {seed})");
        }
        None => {
            generate(io::stdout().lock(), count, seed, distinct)
                .context("Failed to write records to stdout")?;
        }
    }
    Ok(())
}

fn generate<W: io::Write>(writer: W, count: usize, seed: u64, distinct: bool) -> io::Result<()> {
    if distinct {
        data_gen::write_distinct_counts(writer, count, seed)
    } else {
        data_gen::write_counts(writer, count, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        run(100, 7, false, Some(path.to_str().unwrap().to_string())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 100);
        assert!(contents.starts_with("http://api.tech.com/item/0 "));

        let mut expected = Vec::new();
        generate(&mut expected, 100, 7, false).unwrap();
        assert_eq!(contents.as_bytes(), expected.as_slice());
    }

    #[test]
    fn test_generate_distinct() {
        let mut out = Vec::new();
        generate(&mut out, 50, 1, true).unwrap();
        let mut counts: Vec<u64> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|line| line.rsplit(' ').next().unwrap().parse().unwrap())
            .collect();
        counts.sort_unstable();
        assert_eq!(counts, (1..=50).collect::<Vec<u64>>());
    }
}
