//! The portrait run: load every configured roster, then download each
//! member's portrait into its own file, carrying on past failures.

use crate::{portrait::Portrait, roster::Member, roster::Roster, Error, Mediawiki};
use std::{error::Error as StdError, fs::File, io::Write, path::Path};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Label and member count of each roster, in configuration order.
    pub rosters: Vec<(String, usize)>,
    pub members: usize,
    /// `"Last, First"` of every member whose portrait could not be saved, sorted.
    pub failures: Vec<String>,
}

/// Downloads the portrait of every member of the configured rosters into
/// `dir`, writing progress to `out`.
///
/// Only a roster that cannot be loaded aborts the run; a failing member is
/// reported and recorded in the returned [`Report`].
pub fn run<W: Write>(mw: &Mediawiki, dir: &Path, out: &mut W) -> Result<Report, Error> {
    let mut rosters = Vec::new();
    let mut members = Vec::new();
    for source in &mw.config().rosters {
        let found = mw.query_members(&source.page, &source.section)?;
        rosters.push((source.label.clone(), found.len()));
        members.extend(found);
    }
    let counts: Vec<_> = rosters
        .iter()
        .map(|(label, count)| format!("{count} {label}"))
        .collect();
    writeln!(out, "loading images for {}", counts.join(" and "))?;

    let mut failures = Vec::new();
    for member in &members {
        write!(out, "{member}...")?;
        out.flush()?;
        match save_portrait(mw, member, dir) {
            Ok(bytes) => {
                info!(member = %member, bytes, "saved portrait");
                writeln!(out, " OK")?;
            }
            Err(err) => {
                warn!(member = %member, structural = err.is_structural(), "{err}");
                writeln!(out, " FAILED.")?;
                writeln!(out, "{}", trace(&err))?;
                failures.push(member.to_string());
            }
        }
    }
    failures.sort();
    writeln!(out, "failures:\n{}", failures.join("\n"))?;
    Ok(Report {
        rosters,
        members: members.len(),
        failures,
    })
}

fn save_portrait(mw: &Mediawiki, member: &Member, dir: &Path) -> Result<u64, Error> {
    let mut file = File::create(dir.join(member.file_name()))?;
    mw.download_portrait(&member.article_title(), &mut file)
}

/// An error followed by its chain of sources, one per line.
pub fn trace(err: &dyn StdError) -> String {
    let mut lines = vec![err.to_string()];
    let mut source = err.source();
    while let Some(cause) = source {
        lines.push(format!("caused by: {cause}"));
        source = cause.source();
    }
    lines.join("\n")
}
