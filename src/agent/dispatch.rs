use crate::document::DocumentFormat;
use crate::tabular::TabularFormat;
use std::path::Path;

/// Supported upload kinds, decided by file extension (case-insensitive)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Tabular(TabularFormat),
    Document(DocumentFormat),
}

impl FileKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(FileKind::Tabular(TabularFormat::Csv)),
            "xls" | "xlsx" => Some(FileKind::Tabular(TabularFormat::Workbook)),
            "pdf" => Some(FileKind::Document(DocumentFormat::Pdf)),
            "docx" => Some(FileKind::Document(DocumentFormat::Docx)),
            _ => None,
        }
    }
}

/// Handler chosen for one question
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    General,
    Tabular(&'a Path, TabularFormat),
    Document(&'a Path, DocumentFormat),
    Unsupported,
}

impl<'a> Route<'a> {
    pub fn for_file(file: Option<&'a Path>) -> Self {
        let Some(path) = file else {
            return Route::General;
        };
        match FileKind::from_path(path) {
            Some(FileKind::Tabular(format)) => Route::Tabular(path, format),
            Some(FileKind::Document(format)) => Route::Document(path, format),
            None => Route::Unsupported,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Route::General => "general",
            Route::Tabular(..) => "structured",
            Route::Document(..) => "unstructured",
            Route::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_match_is_case_insensitive() {
        assert_eq!(
            FileKind::from_path(Path::new("DATA.CSV")),
            Some(FileKind::Tabular(TabularFormat::Csv))
        );
        assert_eq!(
            FileKind::from_path(Path::new("Budget.XlSx")),
            Some(FileKind::Tabular(TabularFormat::Workbook))
        );
        assert_eq!(
            FileKind::from_path(Path::new("old.xls")),
            Some(FileKind::Tabular(TabularFormat::Workbook))
        );
        assert_eq!(
            FileKind::from_path(Path::new("Report.PDF")),
            Some(FileKind::Document(DocumentFormat::Pdf))
        );
    }

    #[test]
    fn test_unknown_extensions_have_no_kind() {
        assert_eq!(FileKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(FileKind::from_path(Path::new("README")), None);
        assert_eq!(FileKind::from_path(Path::new("letter.doc")), None);
    }

    #[test]
    fn test_route_for_file() {
        assert_eq!(Route::for_file(None), Route::General);
        assert_eq!(Route::for_file(Some(Path::new("a.json"))), Route::Unsupported);
        assert_eq!(Route::for_file(Some(Path::new("a.docx"))).name(), "unstructured");
        assert_eq!(Route::for_file(Some(Path::new("DATA.CSV"))).name(), "structured");
    }
}
