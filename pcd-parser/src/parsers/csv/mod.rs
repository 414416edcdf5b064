use std::{
    collections::HashMap,
    error::Error,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use csv::ReaderBuilder;
use pcd_core::pointcloud::point::PointCloud;
use rayon::prelude::*;

use super::{build_point_cloud, FileResult, Parser, ParserProvider, RawPoint};

pub struct CsvParserProvider {
    pub filenames: Vec<PathBuf>,
}

impl ParserProvider for CsvParserProvider {
    fn get_parser(&self) -> Box<dyn Parser> {
        Box::new(CsvParser {
            filenames: self.filenames.clone(),
        })
    }
}

/// Delimited text reader for `.csv` and `.txt` point lists.
///
/// Columns are found by header name; a file whose first row is numeric is read
/// positionally as `x, y, z[, intensity]`. Comma, semicolon, tab and whitespace
/// delimiters are detected from the first line.
pub struct CsvParser {
    pub filenames: Vec<PathBuf>,
}

impl Parser for CsvParser {
    fn parse(&self) -> Result<PointCloud, Box<dyn Error>> {
        let start = std::time::Instant::now();
        let files = self
            .filenames
            .par_iter()
            .map(|path| read_csv_file(path))
            .collect::<FileResult<Vec<_>>>()
            .map_err(|e| -> Box<dyn Error> { e })?;
        log::info!("Read CSV time: {:?}", start.elapsed());

        build_point_cloud(files)
    }
}

const FIELD_ALIASES: [(&str, &[&str]); 4] = [
    ("x", &["x", "//x", "px", "easting"]),
    ("y", &["y", "py", "northing"]),
    ("z", &["z", "pz", "elevation", "height"]),
    ("intensity", &["intensity", "i", "scalarintensity", "inten"]),
];

fn read_csv_file(path: &Path) -> FileResult<Vec<RawPoint>> {
    let delimiter = detect_delimiter(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("cannot open {}: {}", path.display(), e))?;

    let mut records = reader.records();
    let first = match records.next() {
        Some(record) => record?,
        None => {
            log::warn!("{} is empty", path.display());
            return Ok(Vec::new());
        }
    };
    let fields = fields_of(&first, delimiter);

    let mut points = Vec::new();
    let field_mapping = if fields.iter().all(|f| f.parse::<f64>().is_ok()) {
        let mapping = positional_mapping(fields.len())?;
        points.push(parse_record(&fields, &mapping, 1)?);
        mapping
    } else {
        create_field_mapping(&fields)?
    };

    for (line, record) in records.enumerate() {
        let record = record?;
        let fields = fields_of(&record, delimiter);
        if fields.is_empty() {
            continue;
        }
        points.push(parse_record(&fields, &field_mapping, line + 2)?);
    }

    log::debug!("{}: {} points", path.display(), points.len());
    Ok(points)
}

fn detect_delimiter(path: &Path) -> FileResult<u8> {
    let mut first_line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut first_line)?;
    let delimiter = [b',', b';', b'\t']
        .into_iter()
        .find(|d| first_line.as_bytes().contains(d))
        .unwrap_or(b' ');
    Ok(delimiter)
}

// Whitespace-separated rows may contain runs of spaces, which csv reports as empty fields.
fn fields_of(record: &csv::StringRecord, delimiter: u8) -> Vec<String> {
    record
        .iter()
        .filter(|f| delimiter != b' ' || !f.is_empty())
        .map(|f| f.trim().to_string())
        .collect()
}

fn normalize(name: &str) -> String {
    name.to_lowercase().replace(['_', '-', ' '], "")
}

fn create_field_mapping(headers: &[String]) -> FileResult<HashMap<&'static str, usize>> {
    let mut mapping = HashMap::new();

    for (index, header) in headers.iter().enumerate() {
        let normalized_header = normalize(header);
        for (field, aliases) in FIELD_ALIASES {
            if !mapping.contains_key(field) && aliases.iter().any(|a| normalize(a) == normalized_header) {
                mapping.insert(field, index);
                break;
            }
        }
    }

    for field in ["x", "y", "z"] {
        if !mapping.contains_key(field) {
            return Err(format!(
                "Required attribute '{}' is missing in CSV headers {:?}",
                field, headers
            )
            .into());
        }
    }

    Ok(mapping)
}

fn positional_mapping(columns: usize) -> FileResult<HashMap<&'static str, usize>> {
    if columns < 3 {
        return Err(format!("expected at least 3 columns, found {}", columns).into());
    }
    Ok(FIELD_ALIASES
        .iter()
        .enumerate()
        .take(columns)
        .map(|(index, (field, _))| (*field, index))
        .collect())
}

fn parse_record(
    fields: &[String],
    field_mapping: &HashMap<&'static str, usize>,
    line: usize,
) -> FileResult<RawPoint> {
    let value = |field: &str| -> FileResult<Option<f64>> {
        match field_mapping.get(field).and_then(|&i| fields.get(i)) {
            Some(text) if !text.is_empty() => text
                .parse::<f64>()
                .map(Some)
                .map_err(|e| format!("line {}: failed to parse '{}': {}", line, field, e).into()),
            _ => Ok(None),
        }
    };
    let required = |field: &str| -> FileResult<f64> {
        value(field)?.ok_or_else(|| format!("line {}: missing '{}' field", line, field).into())
    };

    let intensity = value("intensity")?.unwrap_or(0.0);
    if intensity < 0.0 {
        return Err(format!("line {}: negative intensity {}", line, intensity).into());
    }

    Ok(RawPoint {
        x: required("x")?,
        y: required("y")?,
        z: required("z")?,
        intensity,
    })
}
