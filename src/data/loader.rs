use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    Listing, ListingTable, NEIGHBOURHOOD, NUMBER_OF_REVIEWS, PRICE, REQUIRED_COLUMNS,
    REVIEW_SCORES_RATING, ROOM_TYPE,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while loading a listings file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("unsupported file extension: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("{context}: {message}")]
    Parse { context: String, message: String },

    /// A price that is still not a number once `$` and `,` are stripped.
    #[error("row {row}: price {raw:?} is not a number")]
    Price { row: usize, raw: String },
}

impl LoadError {
    fn parse(context: impl Into<String>, message: impl ToString) -> Self {
        LoadError::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LoadError>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a listings table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one listing per line (the usual export)
/// * `.json`    – `[{ "price": "$120.00", "room_type": ..., ... }, ...]`
/// * `.parquet` – one column per field; `price` may be text or numeric
///
/// Columns beyond the five the explorer uses are ignored.
pub fn load_file(path: &Path) -> Result<ListingTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let listings = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => {
            return Err(LoadError::UnsupportedFormat {
                extension: other.to_string(),
            })
        }
    };

    log::info!("Loaded {} listings from {}", listings.len(), path.display());
    Ok(ListingTable::from_listings(listings))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::parse(format!("opening {}", path.display()), e),
    })
}

// ---------------------------------------------------------------------------
// Cell typing shared by all formats
// ---------------------------------------------------------------------------

/// A cell as it comes out of a reader, before it is typed for its column.
#[derive(Debug, Clone, PartialEq)]
enum RawCell {
    Missing,
    Text(String),
    Number(f64),
}

impl RawCell {
    /// Empty text counts as missing, the way CSV readers treat blank fields.
    fn text(s: &str) -> Self {
        if s.is_empty() {
            RawCell::Missing
        } else {
            RawCell::Text(s.to_string())
        }
    }

    /// A CSV field, with the usual NA spellings read as missing.
    fn csv_field(s: &str) -> Self {
        if NA_VALUES.contains(&s) {
            RawCell::Missing
        } else {
            RawCell::text(s)
        }
    }
}

/// Field values that pandas' `read_csv` reads as NaN by default.
const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Strip the currency symbol and thousands separators, then parse.
///
/// `"$1,234.00"` → `1234.0`. Blank input is a missing price, not an error.
pub fn clean_price(raw: &str, row: usize) -> Result<Option<f64>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    raw.replace(['$', ','], "")
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| LoadError::Price {
            row,
            raw: raw.to_string(),
        })
}

fn listing_from_cells(row: usize, cells: [RawCell; 5]) -> Result<Listing> {
    let [neighbourhood, price, room_type, reviews, score] = cells;
    Ok(Listing {
        neighbourhood_cleansed: text_field(neighbourhood),
        price: match price {
            RawCell::Missing => None,
            RawCell::Number(v) => Some(v),
            RawCell::Text(s) => clean_price(&s, row)?,
        },
        room_type: text_field(room_type),
        number_of_reviews: count_field(row, reviews)?,
        review_scores_rating: float_field(row, REVIEW_SCORES_RATING, score)?,
    })
}

fn text_field(cell: RawCell) -> Option<String> {
    match cell {
        RawCell::Missing => None,
        RawCell::Text(s) => Some(s),
        RawCell::Number(v) => Some(v.to_string()),
    }
}

fn float_field(row: usize, column: &str, cell: RawCell) -> Result<Option<f64>> {
    match cell {
        RawCell::Missing => Ok(None),
        RawCell::Number(v) => Ok(Some(v)),
        RawCell::Text(s) => s.trim().parse::<f64>().map(Some).map_err(|_| {
            LoadError::parse(format!("row {row}, {column}"), format!("'{s}' is not a number"))
        }),
    }
}

fn count_field(row: usize, cell: RawCell) -> Result<Option<i64>> {
    let not_a_count = |raw: &str| {
        LoadError::parse(
            format!("row {row}, {NUMBER_OF_REVIEWS}"),
            format!("'{raw}' is not a whole number"),
        )
    };
    let whole = |v: f64| (v.fract() == 0.0 && v.is_finite()).then_some(v as i64);

    match cell {
        RawCell::Missing => Ok(None),
        RawCell::Number(v) => whole(v).map(Some).ok_or_else(|| not_a_count(&v.to_string())),
        RawCell::Text(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                return Ok(Some(i));
            }
            t.parse::<f64>()
                .ok()
                .and_then(whole)
                .map(Some)
                .ok_or_else(|| not_a_count(&s))
        }
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Vec<Listing>> {
    // Short rows are allowed; their missing trailing fields read as missing.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(open(path)?);
    let headers = reader
        .headers()
        .map_err(|e| LoadError::parse("reading CSV headers", e))?
        .clone();

    let mut indices = [0usize; 5];
    for (slot, name) in indices.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| LoadError::parse("CSV header", format!("missing '{name}' column")))?;
    }

    let mut listings = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::parse(format!("CSV row {row_no}"), e))?;
        let cells = indices.map(|idx| RawCell::csv_field(record.get(idx).unwrap_or("")));
        listings.push(listing_from_cells(row_no, cells)?);
    }
    Ok(listings)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "neighbourhood_cleansed": "Back Bay",
///     "price": "$250.00",
///     "room_type": "Entire home/apt",
///     "number_of_reviews": 12,
///     "review_scores_rating": 4.8
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Listing>> {
    let root: JsonValue = serde_json::from_reader(io::BufReader::new(open(path)?))
        .map_err(|e| LoadError::parse("parsing JSON", e))?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::parse("JSON", "expected top-level array"))?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .ok_or_else(|| LoadError::parse(format!("JSON row {i}"), "not an object"))?;
            let cells = REQUIRED_COLUMNS.map(|name| json_cell(obj.get(name)));
            listing_from_cells(i, cells)
        })
        .collect()
}

fn json_cell(val: Option<&JsonValue>) -> RawCell {
    match val {
        None | Some(JsonValue::Null) => RawCell::Missing,
        Some(JsonValue::String(s)) => RawCell::text(s),
        Some(JsonValue::Number(n)) => n.as_f64().map_or(RawCell::Missing, RawCell::Number),
        Some(other) => RawCell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load listings from a Parquet file written by Pandas or Polars.
///
/// Each of the five columns may be text or numeric; text prices go through
/// the same currency cleaning as CSV.
fn load_parquet(path: &Path) -> Result<Vec<Listing>> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)
        .map_err(|e| LoadError::parse("reading parquet metadata", e))?;
    let reader = builder
        .build()
        .map_err(|e| LoadError::parse("building parquet reader", e))?;

    let mut listings = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| LoadError::parse("reading parquet record batch", e))?;
        let schema = batch.schema();

        let mut columns: Vec<&ArrayRef> = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for name in REQUIRED_COLUMNS {
            let idx = schema
                .index_of(name)
                .map_err(|_| LoadError::parse("parquet schema", format!("missing '{name}' column")))?;
            columns.push(batch.column(idx));
        }

        for row in 0..batch.num_rows() {
            let row_no = listings.len();
            let cells = [
                arrow_cell(columns[0], row, NEIGHBOURHOOD)?,
                arrow_cell(columns[1], row, PRICE)?,
                arrow_cell(columns[2], row, ROOM_TYPE)?,
                arrow_cell(columns[3], row, NUMBER_OF_REVIEWS)?,
                arrow_cell(columns[4], row, REVIEW_SCORES_RATING)?,
            ];
            listings.push(listing_from_cells(row_no, cells)?);
        }
    }
    Ok(listings)
}

/// Read one cell of a text or numeric Arrow column.
fn arrow_cell(col: &ArrayRef, row: usize, name: &str) -> Result<RawCell> {
    if col.is_null(row) {
        return Ok(RawCell::Missing);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|a| RawCell::text(a.value(row))),
        DataType::LargeUtf8 => col.as_string_opt::<i64>().map(|a| RawCell::text(a.value(row))),
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| RawCell::Number(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| RawCell::Number(a.value(row))),
        _ => None,
    };
    cell.ok_or_else(|| {
        LoadError::parse(
            format!("parquet column '{name}'"),
            format!("unsupported type {:?}", col.data_type()),
        )
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{BooleanArray, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str =
        "id,neighbourhood_cleansed,price,room_type,number_of_reviews,review_scores_rating,host_name";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn clean_price_strips_currency_formatting() {
        assert_eq!(clean_price("$1,234", 0).unwrap(), Some(1234.0));
        assert_eq!(clean_price("$0", 0).unwrap(), Some(0.0));
        assert_eq!(clean_price("$12,500.50", 0).unwrap(), Some(12500.5));
        assert_eq!(clean_price("85", 0).unwrap(), Some(85.0));
        assert_eq!(clean_price("", 0).unwrap(), None);
    }

    #[test]
    fn clean_price_rejects_non_numeric_values() {
        match clean_price("$call us", 7) {
            Err(LoadError::Price { row, raw }) => {
                assert_eq!(row, 7);
                assert_eq!(raw, "$call us");
            }
            other => panic!("expected price error, got {other:?}"),
        }
        assert!(matches!(clean_price("$", 0), Err(LoadError::Price { .. })));
    }

    #[test]
    fn loads_csv_and_ignores_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER}\n\
             1,Back Bay,\"$1,250.00\",Entire home/apt,12,4.9,Ann\n\
             2,Allston,$60.00,Private room,0,,Bo\n\
             3,,$75.00,Private room,3,4.1,Cy\n"
        );
        let path = write_file(&dir, "listings.csv", &csv);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);

        let first = &table.listings[0];
        assert_eq!(first.neighbourhood_cleansed.as_deref(), Some("Back Bay"));
        assert_eq!(first.price, Some(1250.0));
        assert_eq!(first.room_type.as_deref(), Some("Entire home/apt"));
        assert_eq!(first.number_of_reviews, Some(12));
        assert_eq!(first.review_scores_rating, Some(4.9));

        assert_eq!(table.listings[1].review_scores_rating, None);
        assert_eq!(table.listings[2].neighbourhood_cleansed, None);
        assert_eq!(table.price_bounds, Some((60.0, 1250.0)));
    }

    #[test]
    fn csv_with_bad_price_is_a_price_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("{HEADER}\n1,Back Bay,$12a,Entire home/apt,1,4.0,Ann\n");
        let path = write_file(&dir, "listings.csv", &csv);

        assert!(matches!(
            load_file(&path),
            Err(LoadError::Price { row: 0, .. })
        ));
    }

    #[test]
    fn csv_missing_a_column_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "listings.csv",
            "neighbourhood_cleansed,price,room_type\nBack Bay,$10,Private room\n",
        );

        match load_file(&path) {
            Err(LoadError::Parse { message, .. }) => {
                assert!(message.contains("number_of_reviews"), "{message}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn csv_with_bad_score_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!("{HEADER}\n1,Back Bay,$10,Private room,1,great,Ann\n");
        let path = write_file(&dir, "listings.csv", &csv);
        assert!(matches!(load_file(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn csv_na_spellings_load_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "{HEADER}\n\
             1,Back Bay,$100,Entire home/apt,0,N/A,Ann\n\
             2,NA,$80,Private room,NULL,4.5,Bo\n\
             3,Fenway,$90,Private room,2,4.0,Cy\n"
        );
        let path = write_file(&dir, "listings.csv", &csv);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.listings[0].review_scores_rating, None);
        assert_eq!(table.listings[1].neighbourhood_cleansed, None);
        assert_eq!(table.listings[1].number_of_reviews, None);
        // "NA" is not a neighbourhood of its own.
        let hoods: Vec<&str> = table.neighbourhoods.iter().map(String::as_str).collect();
        assert_eq!(hoods, ["Back Bay", "Fenway"]);
        assert_eq!(crate::data::project::project(&table.listings).len(), 1);
    }

    #[test]
    fn csv_short_rows_leave_trailing_fields_missing() {
        let dir = tempfile::tempdir().unwrap();
        let csv = "neighbourhood_cleansed,price,room_type,number_of_reviews,review_scores_rating\n\
                   Back Bay,$100,Entire home/apt,0\n\
                   Allston,$60\n\
                   Fenway,$90,Private room,2,4.0\n";
        let path = write_file(&dir, "listings.csv", csv);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.listings[0].number_of_reviews, Some(0));
        assert_eq!(table.listings[0].review_scores_rating, None);
        assert_eq!(table.listings[1].price, Some(60.0));
        assert_eq!(table.listings[1].room_type, None);
        assert_eq!(table.listings[2].review_scores_rating, Some(4.0));
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.csv");
        match load_file(&path) {
            Err(LoadError::FileNotFound { path: p }) => assert_eq!(p, path),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "listings.xlsx", "");
        assert!(matches!(
            load_file(&path),
            Err(LoadError::UnsupportedFormat { extension }) if extension == "xlsx"
        ));
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"[
            {"neighbourhood_cleansed": "Fenway", "price": "$2,000.00",
             "room_type": "Entire home/apt", "number_of_reviews": 4,
             "review_scores_rating": 4.5, "id": 99},
            {"neighbourhood_cleansed": "Fenway", "price": 80.0,
             "room_type": "Private room", "number_of_reviews": 2.0,
             "review_scores_rating": null}
        ]"#;
        let path = write_file(&dir, "listings.json", json);

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings[0].price, Some(2000.0));
        assert_eq!(table.listings[1].price, Some(80.0));
        assert_eq!(table.listings[1].number_of_reviews, Some(2));
        assert_eq!(table.listings[1].review_scores_rating, None);
    }

    #[test]
    fn json_that_is_not_an_array_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "listings.json", r#"{"price": "$10"}"#);
        match load_file(&path) {
            Err(LoadError::Parse { context, .. }) => assert_eq!(context, "JSON"),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    fn write_parquet(path: &Path, fields: Vec<Field>, columns: Vec<ArrayRef>) {
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_missing_a_column_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.parquet");
        write_parquet(
            &path,
            vec![
                Field::new(NEIGHBOURHOOD, DataType::Utf8, true),
                Field::new(PRICE, DataType::Float64, true),
                Field::new(NUMBER_OF_REVIEWS, DataType::Int64, true),
                Field::new(REVIEW_SCORES_RATING, DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["Fenway"])),
                Arc::new(Float64Array::from(vec![100.0])),
                Arc::new(Int64Array::from(vec![3])),
                Arc::new(Float64Array::from(vec![4.5])),
            ],
        );

        match load_file(&path) {
            Err(LoadError::Parse { message, .. }) => {
                assert!(message.contains(ROOM_TYPE), "{message}")
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn parquet_column_of_unsupported_type_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.parquet");
        write_parquet(
            &path,
            vec![
                Field::new(NEIGHBOURHOOD, DataType::Utf8, true),
                Field::new(PRICE, DataType::Boolean, true),
                Field::new(ROOM_TYPE, DataType::Utf8, true),
                Field::new(NUMBER_OF_REVIEWS, DataType::Int64, true),
                Field::new(REVIEW_SCORES_RATING, DataType::Float64, true),
            ],
            vec![
                Arc::new(StringArray::from(vec!["Fenway"])),
                Arc::new(BooleanArray::from(vec![true])),
                Arc::new(StringArray::from(vec!["Private room"])),
                Arc::new(Int64Array::from(vec![3])),
                Arc::new(Float64Array::from(vec![4.5])),
            ],
        );

        match load_file(&path) {
            Err(LoadError::Parse { context, message }) => {
                assert_eq!(context, "parquet column 'price'");
                assert!(message.contains("Boolean"), "{message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn loads_parquet_with_text_prices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("listings.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(NEIGHBOURHOOD, DataType::Utf8, true),
            Field::new(PRICE, DataType::Utf8, true),
            Field::new(ROOM_TYPE, DataType::Utf8, true),
            Field::new(NUMBER_OF_REVIEWS, DataType::Int64, true),
            Field::new(REVIEW_SCORES_RATING, DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("Dorchester"), Some("Roxbury")])),
                Arc::new(StringArray::from(vec![Some("$1,100.00"), None])),
                Arc::new(StringArray::from(vec![Some("Entire home/apt"), Some("Shared room")])),
                Arc::new(Int64Array::from(vec![Some(5), Some(0)])),
                Arc::new(Float64Array::from(vec![Some(4.2), None])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.listings[0].price, Some(1100.0));
        assert_eq!(table.listings[0].number_of_reviews, Some(5));
        assert_eq!(table.listings[1].price, None);
        assert_eq!(table.listings[1].review_scores_rating, None);
    }
}
