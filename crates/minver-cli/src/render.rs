//! Text and JSON rendering of check reports.

use std::io::Write;

use minver::{CheckReport, CheckStatus, ResolvedSymbol};
use minver_store::OsVersion;
use serde::Serialize;

/// One symbol in the JSON report.
#[derive(Debug, Serialize)]
pub struct JsonSymbol<'a> {
    pub dll_path: String,
    pub dll_name: &'a str,
    pub symbol: &'a str,
    pub os_version: &'static str,
    pub os_version_number: i32,
    pub os_build: String,
    pub os_build_number: u32,
    /// Import chains, root first (`app.exe -> helper.dll`)
    pub used_by: Vec<String>,
}

/// JSON report of one root.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub file: String,
    pub result: &'static str,
    pub os_version: &'static str,
    pub os_version_number: i32,
    pub os_build: String,
    pub os_build_number: u32,
    pub symbols_checked: usize,
    pub symbols: Vec<JsonSymbol<'a>>,
    pub symbols_at_max_version: Vec<JsonSymbol<'a>>,
    pub unexpected_symbols: Vec<JsonSymbol<'a>>,
    pub disallowed_symbols: Vec<JsonSymbol<'a>>,
    pub unresolved_modules: &'a [String],
}

impl<'a> JsonSymbol<'a> {
    fn new(symbol: &'a ResolvedSymbol) -> Self {
        Self {
            dll_path: symbol.module.id_string().into_owned(),
            dll_name: &symbol.module_name,
            symbol: &symbol.symbol,
            os_version: symbol.version.version.name(),
            os_version_number: symbol.version.version.as_i32(),
            os_build: symbol.version.build.to_string(),
            os_build_number: symbol.version.build.build_number().unwrap_or(0),
            used_by: symbol
                .usage_paths
                .iter()
                .map(|path| path.format_chain())
                .collect(),
        }
    }
}

impl<'a> JsonReport<'a> {
    pub fn new(report: &'a CheckReport) -> Self {
        let symbols = |list: &'a [ResolvedSymbol]| -> Vec<JsonSymbol<'a>> {
            list.iter().map(JsonSymbol::new).collect()
        };

        Self {
            file: report.root.display().to_string(),
            result: report.status.as_str(),
            os_version: report.required.version.name(),
            os_version_number: report.required.version.as_i32(),
            os_build: report.required.build.to_string(),
            os_build_number: report.required.build.build_number().unwrap_or(0),
            symbols_checked: report.symbols_checked,
            symbols: symbols(&report.all_matched),
            symbols_at_max_version: symbols(&report.at_required),
            unexpected_symbols: symbols(&report.unexpected),
            disallowed_symbols: symbols(&report.disallowed),
            unresolved_modules: &report.unresolved_modules,
        }
    }
}

/// Pretty JSON: one object for a single root, an array for several.
pub fn write_json(out: &mut impl Write, reports: &[CheckReport]) -> crate::Result<()> {
    let rendered: Vec<_> = reports.iter().map(JsonReport::new).collect();

    match rendered.as_slice() {
        [single] => serde_json::to_writer_pretty(&mut *out, single)?,
        many => serde_json::to_writer_pretty(&mut *out, many)?,
    }
    writeln!(out)?;
    Ok(())
}

/// Human-readable report, one block per root.
pub fn write_text(out: &mut impl Write, reports: &[CheckReport]) -> crate::Result<()> {
    for (index, report) in reports.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }
        write_report(out, report)?;
    }
    Ok(())
}

fn write_report(out: &mut impl Write, report: &CheckReport) -> std::io::Result<()> {
    writeln!(out, "File: {}", report.root.display())?;

    if report.status == CheckStatus::NoSymbols {
        writeln!(out, "Result: no symbols found")?;
        return write_unresolved(out, &report.unresolved_modules);
    }

    let result = match report.status {
        CheckStatus::Ok => "OK",
        _ => "FAIL",
    };
    writeln!(out, "Result: {}", result)?;
    writeln!(out, "Total symbols checked: {}", report.symbols_checked)?;
    writeln!(out, "Required OS version: {}", required_line(report.required))?;

    writeln!(out)?;
    writeln!(
        out,
        "Symbols at that OS version ({}):",
        report.at_required.len()
    )?;
    write_symbols(out, &report.at_required)?;

    if let Some(threshold) = report.max_allowed {
        writeln!(out)?;
        if report.unexpected.is_empty() {
            writeln!(out, "No symbols found above expected max OS {}", threshold)?;
        } else {
            writeln!(
                out,
                "Symbols above expected max OS {} ({}):",
                threshold,
                report.unexpected.len()
            )?;
            write_symbols(out, &report.unexpected)?;
        }
    }

    if !report.disallowed.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Symbols from disallowed modules ({}):",
            report.disallowed.len()
        )?;
        write_symbols(out, &report.disallowed)?;
    }

    write_unresolved(out, &report.unresolved_modules)
}

fn required_line(required: OsVersion) -> String {
    format!(
        "{} ({}, build {})",
        required.version.name(),
        required.build,
        required.build.build_number().unwrap_or(0)
    )
}

fn write_unresolved(out: &mut impl Write, modules: &[String]) -> std::io::Result<()> {
    if modules.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "Unresolved modules ({}):", modules.len())?;
    for module in modules {
        writeln!(out, "    {}", module)?;
    }
    Ok(())
}

/// Aligned columns: module, symbol, version, build, build number.
fn write_symbols(out: &mut impl Write, symbols: &[ResolvedSymbol]) -> std::io::Result<()> {
    let rows: Vec<[String; 5]> = symbols
        .iter()
        .map(|symbol| {
            [
                symbol.module_name.clone(),
                symbol.symbol.clone(),
                symbol.version.version.name().to_string(),
                symbol.version.build.to_string(),
                symbol.version.build.build_number().unwrap_or(0).to_string(),
            ]
        })
        .collect();

    let mut widths = [0usize; 4];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    for [module, symbol, version, build, number] in &rows {
        writeln!(
            out,
            "    {:<w0$}{:<w1$}{:<w2$}{:<w3$}{}",
            module,
            symbol,
            version,
            build,
            number,
            w0 = widths[0] + 3,
            w1 = widths[1] + 3,
            w2 = widths[2] + 3,
            w3 = widths[3] + 3,
        )?;
    }
    Ok(())
}
