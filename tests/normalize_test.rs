use data_agent::tabular::{normalize_file, ColumnKind, Cell};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fresh directory under the system temp dir
fn fixture_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("normalize-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_csv_is_normalized() {
    let dir = fixture_dir();
    let path = write_file(
        &dir,
        "sales.csv",
        "Region, Total Sales ($) ,Order Date,\nNorth,10,2024-01-15,a\nSouth,N/A,2024-02-01,b\nEast,7.5,not a date,c\n",
    );

    let dataset = normalize_file(&path);
    assert_eq!(
        dataset.column_names(),
        vec!["Region", "Total_Sales____", "Order_Date", "unnamed_col_3"]
    );
    assert_eq!(dataset.row_count(), 3);

    let sales = dataset.column("Total_Sales____").unwrap();
    assert_eq!(sales.kind, ColumnKind::Numeric);
    assert_eq!(sales.values, vec![Cell::Number(10.0), Cell::Missing, Cell::Number(7.5)]);

    let dates = dataset.column("Order_Date").unwrap();
    assert_eq!(dates.kind, ColumnKind::Date);
    assert_eq!(
        dates.values,
        vec![
            Cell::Text("2024-01-15".to_string()),
            Cell::Text("2024-02-01".to_string()),
            Cell::Missing,
        ]
    );

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_half_dates_stay_text() {
    let dir = fixture_dir();
    let path = write_file(&dir, "half.csv", "when\n2024-01-01\nsoon\n2024-03-01\nlater\n");

    let dataset = normalize_file(&path);
    let column = dataset.column("when").unwrap();
    assert_eq!(column.kind, ColumnKind::Text);
    assert_eq!(column.values[1], Cell::Text("soon".to_string()));

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_uppercase_extension_and_month_first_dates() {
    let dir = fixture_dir();
    let path = write_file(&dir, "DATA.CSV", "day,amount\n03/04/2024,1\n12/31/2023,2\n");

    let dataset = normalize_file(&path);
    let day = dataset.column("day").unwrap();
    assert_eq!(day.kind, ColumnKind::Date);
    assert_eq!(day.values[0], Cell::Text("2024-03-04".to_string()));
    assert_eq!(day.values[1], Cell::Text("2023-12-31".to_string()));

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_malformed_csv_is_empty() {
    let dir = fixture_dir();
    let path = write_file(&dir, "bad.csv", "a,b\n1,2\n3,4,5,6\n");
    assert!(normalize_file(&path).is_empty());

    let missing = dir.join("does-not-exist.csv");
    assert!(normalize_file(&missing).is_empty());

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_short_records_are_padded() {
    let dir = fixture_dir();
    let path = write_file(&dir, "short.csv", "a,b,c\n1,2,3\n4\n");

    let dataset = normalize_file(&path);
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.column("c").unwrap().values, vec![Cell::Number(3.0), Cell::Missing]);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_xlsx_first_sheet_is_read() {
    let dir = fixture_dir();
    let path = dir.join("Budget.XLSX");

    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Dept Name").unwrap();
    sheet.write_string(0, 1, "Budget").unwrap();
    sheet.write_string(0, 2, "Start").unwrap();
    sheet.write_string(1, 0, "Ops").unwrap();
    sheet.write_number(1, 1, 1200.0).unwrap();
    sheet.write_string(1, 2, "2024-01-01").unwrap();
    sheet.write_string(2, 0, "R&D").unwrap();
    sheet.write_number(2, 1, 3400.5).unwrap();
    sheet.write_string(2, 2, "2024-07-01").unwrap();

    let second = workbook.add_worksheet();
    second.write_string(0, 0, "ignored").unwrap();
    workbook.save(&path).unwrap();

    let dataset = normalize_file(&path);
    assert_eq!(dataset.column_names(), vec!["Dept_Name", "Budget", "Start"]);
    assert_eq!(dataset.row_count(), 2);
    assert_eq!(dataset.column("Budget").unwrap().kind, ColumnKind::Numeric);
    assert_eq!(dataset.column("Start").unwrap().kind, ColumnKind::Date);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_xlsx_datetime_cells_become_dates() {
    let dir = fixture_dir();
    let path = dir.join("orders.xlsx");

    let date_format = rust_xlsxwriter::Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Order Date").unwrap();
    sheet.write_string(0, 1, "Amount").unwrap();
    let placed = rust_xlsxwriter::ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
    let closed = rust_xlsxwriter::ExcelDateTime::from_ymd(2023, 12, 31).unwrap();
    sheet.write_datetime_with_format(1, 0, &placed, &date_format).unwrap();
    sheet.write_number(1, 1, 40.0).unwrap();
    sheet.write_datetime_with_format(2, 0, &closed, &date_format).unwrap();
    sheet.write_number(2, 1, 12.5).unwrap();
    workbook.save(&path).unwrap();

    let dataset = normalize_file(&path);
    let dates = dataset.column("Order_Date").unwrap();
    assert_eq!(dates.kind, ColumnKind::Date);
    assert_eq!(
        dates.values,
        vec![
            Cell::Text("2024-03-05".to_string()),
            Cell::Text("2023-12-31".to_string()),
        ]
    );
    assert_eq!(dataset.column("Amount").unwrap().kind, ColumnKind::Numeric);

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn test_workbook_without_sheets_is_empty() {
    let dir = fixture_dir();
    let path = dir.join("empty.xlsx");

    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    let parts = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#,
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets/></workbook>"#,
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"></Relationships>"#,
        ),
    ];
    for (name, body) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    }
    zip.finish().unwrap();

    assert!(normalize_file(&path).is_empty());

    std::fs::remove_dir_all(dir).unwrap();
}
