use crate::batch::{is_supported, BatchOutcome, BatchProcessor, FileJob, JobStatus};
use crate::catalog::{ExtractionMode, FieldDefinition, ANCHOR, FIELD_CATALOG};
use crate::config::Config;
use crate::error::{FdmError, FdmResult};
use crate::excel::address::column_index_to_letter;
use crate::excel::{deliver, is_output_file_name, FormulaBuilder, OutputComposer};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Expand directories into their workbook entries, sorted by name.
/// Plain file arguments are kept as given, so a bad path fails its own job.
/// Workbooks delivered earlier under `output_prefix` are not inputs.
pub fn collect_inputs(inputs: &[PathBuf], output_prefix: &str) -> FdmResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| {
                    path.is_file()
                        && is_supported(path)
                        && !is_lock_file(path)
                        && !is_previous_output(path, output_prefix)
                })
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }

    Ok(files)
}

/// Office lock files (`~$Book.xlsx`) sit next to open workbooks
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with("~$"))
        .unwrap_or(false)
}

fn is_previous_output(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .map(|n| is_output_file_name(prefix, &n.to_string_lossy()))
        .unwrap_or(false)
}

fn write_report(outcome: &BatchOutcome, path: &Path) -> FdmResult<()> {
    fs::write(path, outcome.report_json()?)?;
    Ok(())
}

/// Execute the extract command
pub fn extract(
    inputs: Vec<PathBuf>,
    output_dir: PathBuf,
    config: &Config,
    report: Option<PathBuf>,
    verbose: bool,
) -> FdmResult<PathBuf> {
    println!("{}", "📊 FDM Extractor - Extract".bold().green());

    let files = collect_inputs(&inputs, &config.output.file_prefix)?;
    println!("   Files:  {}", files.len());
    println!("   Output: {}\n", output_dir.display());

    let jobs: Vec<FileJob> = files.into_iter().map(FileJob::new).collect();
    let processor = BatchProcessor::new(config)?;

    let outcome = processor.run(jobs, |progress| {
        let counter = format!("[{}/{}]", progress.processed, progress.total);
        match progress.job.status() {
            JobStatus::Completed => {
                println!("   {} {} {}", counter.dimmed(), "✅".green(), progress.job.name)
            }
            JobStatus::Error(msg) => println!(
                "   {} {} {}: {}",
                counter.dimmed(),
                "❌".red(),
                progress.job.name,
                msg.red()
            ),
            other => println!("   {} {} ({})", counter.dimmed(), progress.job.name, other),
        }
    })?;

    if verbose {
        for record in &outcome.records {
            let missing: Vec<_> = record.missing().collect();
            if missing.is_empty() {
                continue;
            }
            println!("\n   {} {}", "⚠️".yellow(), record.source.bright_blue());
            for (column, reason) in missing {
                println!(
                    "      {} {}: {}",
                    column.letter().cyan(),
                    column.label(),
                    reason.to_string().yellow()
                );
            }
        }
    }

    println!(
        "\n   Completed: {}   Failed: {}",
        outcome.completed().to_string().green(),
        outcome.failed().to_string().red()
    );

    if let Some(report_path) = report {
        match write_report(&outcome, &report_path) {
            Ok(()) => println!("   Report: {}", report_path.display()),
            Err(e) => {
                warn!(path = %report_path.display(), error = %e, "report not written");
                println!(
                    "   {} Report not written ({}): {}",
                    "⚠️".yellow(),
                    report_path.display(),
                    e.to_string().yellow()
                );
            }
        }
    }

    let records = outcome.require_records()?;

    if verbose {
        println!("\n{}", "📝 Composing Results + Summary...".cyan());
    }
    let output = OutputComposer::new(config)?.compose(records)?;
    let rows = output.row_count();
    let path = deliver(
        output,
        &output_dir,
        &config.output.file_prefix,
        chrono::Local::now(),
    )?;

    println!("\n{}", "✅ Extraction Complete!".bold().green());
    println!("   {} rows → {}\n", rows, path.display());

    Ok(path)
}

/// Where a catalog field comes from, for display
fn describe_source(field: &FieldDefinition, formulas: &FormulaBuilder) -> String {
    let sheet = field.sheet.unwrap_or("-");
    match field.mode {
        ExtractionMode::Static { address } => format!("{}!{}", sheet, address),
        ExtractionMode::KeywordScan {
            keyword,
            value_offset,
        } => format!("{} ~ \"{}\" (+{} cols)", sheet, keyword, value_offset),
        ExtractionMode::AnchorRelative { row_offset, col } => format!(
            "{} ~ \"{}\" (+{} rows, col {})",
            sheet,
            ANCHOR.marker,
            row_offset,
            column_index_to_letter(col as usize)
        ),
        ExtractionMode::Formula => formulas
            .row_formula(field.column, 2)
            .unwrap_or_default(),
    }
}

/// Execute the catalog command
pub fn catalog(config: &Config) -> FdmResult<()> {
    println!("{}", "📋 FDM Extractor - Field Catalog".bold().green());
    println!("   {} fields (+ NO)\n", FIELD_CATALOG.len());

    let formulas = FormulaBuilder::new(config);
    for field in FIELD_CATALOG.iter() {
        let source = describe_source(field, &formulas);
        let source = if field.is_formula() {
            source.bright_yellow()
        } else {
            source.cyan()
        };
        println!(
            "   {:>3}  {}\n        {}",
            field.column.letter().bold(),
            field.label(),
            source
        );
    }
    println!();

    Ok(())
}

/// Execute the init-config command
pub fn init_config(path: PathBuf, force: bool) -> FdmResult<()> {
    if path.exists() && !force {
        return Err(FdmError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    fs::write(&path, Config::default().to_yaml()?)?;

    println!("{}", "✅ Default configuration written".bold().green());
    println!("   {}\n", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_collect_inputs_expands_directories_sorted() {
        let temp = TempDir::new().unwrap();
        for name in ["b.xlsx", "a.xlsm", "notes.txt", "~$a.xlsx", "c.XLSX"] {
            fs::write(temp.path().join(name), b"").unwrap();
        }
        fs::create_dir(temp.path().join("sub.xlsx")).unwrap();

        let files = collect_inputs(&[temp.path().to_path_buf()], "Hasil").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.xlsm", "b.xlsx", "c.XLSX"]);
    }

    #[test]
    fn test_collect_inputs_keeps_plain_files() {
        let files = collect_inputs(&[PathBuf::from("missing.xlsx")], "Hasil").unwrap();
        assert_eq!(files, vec![PathBuf::from("missing.xlsx")]);
    }

    #[test]
    fn test_collect_inputs_skips_previous_output() {
        let temp = TempDir::new().unwrap();
        for name in [
            "Hasil_Ekstraksi_FDM_20260309_140507.xlsx",
            "Hasil_Ekstraksi_FDM_final.xlsx",
            "form.xlsx",
        ] {
            fs::write(temp.path().join(name), b"").unwrap();
        }

        let files = collect_inputs(&[temp.path().to_path_buf()], "Hasil_Ekstraksi_FDM").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Hasil_Ekstraksi_FDM_final.xlsx", "form.xlsx"]);

        // named explicitly, an earlier output is still processed
        let explicit = temp.path().join("Hasil_Ekstraksi_FDM_20260309_140507.xlsx");
        let files = collect_inputs(&[explicit.clone()], "Hasil_Ekstraksi_FDM").unwrap();
        assert_eq!(files, vec![explicit]);
    }

    #[test]
    fn test_describe_sources() {
        let formulas = FormulaBuilder::new(&Config::default());
        let described: Vec<String> = FIELD_CATALOG
            .iter()
            .map(|f| describe_source(f, &formulas))
            .collect();

        assert!(described.contains(&"Sheet Home!H5".to_string()));
        assert!(described.contains(&"C.1 ~ \"emplasemen\" (+4 cols)".to_string()));
        assert!(described.contains(&"FDM ~ \"DATA BUMI\" (+4 rows, col H)".to_string()));
        assert!(described.contains(&"=K2".to_string()));
    }

    #[test]
    fn test_init_config_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("fdm.yaml");

        init_config(path.clone(), false).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, Config::default());

        assert!(init_config(path.clone(), false).is_err());
        assert!(init_config(path, true).is_ok());
    }
}
