// src/io.rs
// =============================================================================
// Reading the site list and writing the results, both as CSV.
//
// Input:  any comma-separated text, no header row; only the first column is
//         used, everything after it is ignored.
// Output: one "site,logo_url" record per site that has a logo. Sites without
//         a logo are left out entirely (their failure is already in the log).
// =============================================================================

use anyhow::{Context, Result};
use csv::{QuoteStyle, ReaderBuilder, WriterBuilder};
use std::collections::BTreeSet;
use std::io::{Read, Write};

use crate::crawl::LogoResult;

/// Collects the distinct sites from the first column of `reader`
pub fn read_sites<R: Read>(reader: R) -> Result<BTreeSet<String>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut sites = BTreeSet::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("could not read input record {}", line + 1))?;
        if let Some(site) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
            sites.insert(site.to_string());
        }
    }

    Ok(sites)
}

// Writes every result that has a logo, in the order given
//
// Returns how many records were written.
pub fn write_results<W: Write>(writer: W, results: &[LogoResult]) -> Result<usize> {
    let mut csv_writer = WriterBuilder::new()
        .quote(b'|')
        .quote_style(QuoteStyle::Necessary)
        .from_writer(writer);

    let mut written = 0;
    for result in results {
        if let Some(logo_url) = &result.logo_url {
            csv_writer
                .write_record([result.site.as_str(), logo_url.as_str()])
                .context("could not write result")?;
            written += 1;
        }
    }

    csv_writer.flush().context("could not flush results")?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_column_deduplicated() {
        let input = "acme.test,1\nexample.org\nacme.test,2,extra\n\n  spaced.test  ,x\n";
        let sites = read_sites(input.as_bytes()).unwrap();
        let sites: Vec<_> = sites.into_iter().collect();
        assert_eq!(sites, vec!["acme.test", "example.org", "spaced.test"]);
    }

    #[test]
    fn test_only_sites_with_logo_written() {
        let results = vec![
            LogoResult {
                site: "acme.test".to_string(),
                logo_url: Some("http://acme.test/logo.svg".to_string()),
            },
            LogoResult {
                site: "down.test".to_string(),
                logo_url: None,
            },
            LogoResult {
                site: "comma.test".to_string(),
                logo_url: Some("http://comma.test/a,b.png".to_string()),
            },
        ];

        let mut out = Vec::new();
        let written = write_results(&mut out, &results).unwrap();

        assert_eq!(written, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "acme.test,http://acme.test/logo.svg\ncomma.test,|http://comma.test/a,b.png|\n"
        );
    }
}
