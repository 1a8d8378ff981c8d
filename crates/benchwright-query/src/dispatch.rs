use std::path::{Path, PathBuf};

use benchwright_core::{ComponentSet, TemplateCall, format_f64, scan_calls};
use tracing::debug;

use crate::adapters::table::{self, Aggregate};
use crate::adapters::tree::{self, TreeAggregate, TreeFormat};
use crate::adapters::xml::{self, XmlAggregate};
use crate::adapters::{sqlite, text};
use crate::errors::QueryError;
use crate::filter::FilterPredicate;

/// The closed set of query operations.
///
/// Dispatch is an exhaustive match rather than a name-keyed handler table,
/// so adding an operation without wiring it up fails at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    FileLine,
    FileWord,
    FileLineCount,
    FileWordCount,
    CsvCell,
    CsvRow,
    CsvColumn,
    CsvValue,
    CsvSum,
    CsvAvg,
    CsvCount,
    CsvSumWhere,
    CsvAvgWhere,
    CsvCountWhere,
    SqliteQuery,
    SqliteValue,
    JsonPath,
    JsonValue,
    JsonCount,
    JsonKeys,
    JsonSum,
    JsonAvg,
    JsonMax,
    JsonMin,
    JsonCollect,
    JsonCountWhere,
    JsonFilter,
    YamlPath,
    YamlValue,
    YamlCount,
    YamlKeys,
    YamlSum,
    YamlAvg,
    YamlMax,
    YamlMin,
    YamlCollect,
    YamlCountWhere,
    YamlFilter,
    XpathValue,
    XpathAttr,
    XpathCount,
    XpathExists,
    XpathCollect,
    XpathSum,
    XpathAvg,
    XpathMax,
    XpathMin,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        let function = match name {
            "file_line" => Self::FileLine,
            "file_word" => Self::FileWord,
            "file_line_count" => Self::FileLineCount,
            "file_word_count" => Self::FileWordCount,
            "csv_cell" => Self::CsvCell,
            "csv_row" => Self::CsvRow,
            "csv_column" => Self::CsvColumn,
            "csv_value" => Self::CsvValue,
            "csv_sum" => Self::CsvSum,
            "csv_avg" => Self::CsvAvg,
            "csv_count" => Self::CsvCount,
            "csv_sum_where" => Self::CsvSumWhere,
            "csv_avg_where" => Self::CsvAvgWhere,
            "csv_count_where" => Self::CsvCountWhere,
            "sqlite_query" => Self::SqliteQuery,
            "sqlite_value" => Self::SqliteValue,
            "json_path" => Self::JsonPath,
            "json_value" => Self::JsonValue,
            "json_count" => Self::JsonCount,
            "json_keys" => Self::JsonKeys,
            "json_sum" => Self::JsonSum,
            "json_avg" => Self::JsonAvg,
            "json_max" => Self::JsonMax,
            "json_min" => Self::JsonMin,
            "json_collect" => Self::JsonCollect,
            "json_count_where" => Self::JsonCountWhere,
            "json_filter" => Self::JsonFilter,
            "yaml_path" => Self::YamlPath,
            "yaml_value" => Self::YamlValue,
            "yaml_count" => Self::YamlCount,
            "yaml_keys" => Self::YamlKeys,
            "yaml_sum" => Self::YamlSum,
            "yaml_avg" => Self::YamlAvg,
            "yaml_max" => Self::YamlMax,
            "yaml_min" => Self::YamlMin,
            "yaml_collect" => Self::YamlCollect,
            "yaml_count_where" => Self::YamlCountWhere,
            "yaml_filter" => Self::YamlFilter,
            "xpath_value" => Self::XpathValue,
            "xpath_attr" => Self::XpathAttr,
            "xpath_count" => Self::XpathCount,
            "xpath_exists" => Self::XpathExists,
            "xpath_collect" => Self::XpathCollect,
            "xpath_sum" => Self::XpathSum,
            "xpath_avg" => Self::XpathAvg,
            "xpath_max" => Self::XpathMax,
            "xpath_min" => Self::XpathMin,
            _ => return None,
        };
        Some(function)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::FileLine => "file_line",
            Self::FileWord => "file_word",
            Self::FileLineCount => "file_line_count",
            Self::FileWordCount => "file_word_count",
            Self::CsvCell => "csv_cell",
            Self::CsvRow => "csv_row",
            Self::CsvColumn => "csv_column",
            Self::CsvValue => "csv_value",
            Self::CsvSum => "csv_sum",
            Self::CsvAvg => "csv_avg",
            Self::CsvCount => "csv_count",
            Self::CsvSumWhere => "csv_sum_where",
            Self::CsvAvgWhere => "csv_avg_where",
            Self::CsvCountWhere => "csv_count_where",
            Self::SqliteQuery => "sqlite_query",
            Self::SqliteValue => "sqlite_value",
            Self::JsonPath => "json_path",
            Self::JsonValue => "json_value",
            Self::JsonCount => "json_count",
            Self::JsonKeys => "json_keys",
            Self::JsonSum => "json_sum",
            Self::JsonAvg => "json_avg",
            Self::JsonMax => "json_max",
            Self::JsonMin => "json_min",
            Self::JsonCollect => "json_collect",
            Self::JsonCountWhere => "json_count_where",
            Self::JsonFilter => "json_filter",
            Self::YamlPath => "yaml_path",
            Self::YamlValue => "yaml_value",
            Self::YamlCount => "yaml_count",
            Self::YamlKeys => "yaml_keys",
            Self::YamlSum => "yaml_sum",
            Self::YamlAvg => "yaml_avg",
            Self::YamlMax => "yaml_max",
            Self::YamlMin => "yaml_min",
            Self::YamlCollect => "yaml_collect",
            Self::YamlCountWhere => "yaml_count_where",
            Self::YamlFilter => "yaml_filter",
            Self::XpathValue => "xpath_value",
            Self::XpathAttr => "xpath_attr",
            Self::XpathCount => "xpath_count",
            Self::XpathExists => "xpath_exists",
            Self::XpathCollect => "xpath_collect",
            Self::XpathSum => "xpath_sum",
            Self::XpathAvg => "xpath_avg",
            Self::XpathMax => "xpath_max",
            Self::XpathMin => "xpath_min",
        }
    }

    /// (min, max, description) of accepted argument counts.
    fn arity(self) -> (usize, Option<usize>, &'static str) {
        match self {
            Self::FileLineCount | Self::FileWordCount => (1, Some(1), "1"),
            Self::JsonCount | Self::JsonKeys | Self::YamlCount | Self::YamlKeys => {
                (1, Some(2), "1 or 2")
            }
            Self::FileLine
            | Self::FileWord
            | Self::CsvRow
            | Self::CsvColumn
            | Self::CsvSum
            | Self::CsvAvg
            | Self::CsvCount
            | Self::JsonPath
            | Self::JsonValue
            | Self::JsonSum
            | Self::JsonAvg
            | Self::JsonMax
            | Self::JsonMin
            | Self::JsonCollect
            | Self::JsonCountWhere
            | Self::JsonFilter
            | Self::YamlPath
            | Self::YamlValue
            | Self::YamlSum
            | Self::YamlAvg
            | Self::YamlMax
            | Self::YamlMin
            | Self::YamlCollect
            | Self::YamlCountWhere
            | Self::YamlFilter
            | Self::XpathValue
            | Self::XpathAttr
            | Self::XpathCount
            | Self::XpathExists
            | Self::XpathCollect
            | Self::XpathSum
            | Self::XpathAvg
            | Self::XpathMax
            | Self::XpathMin => (2, Some(2), "2"),
            Self::CsvCell | Self::CsvValue => (3, Some(3), "3"),
            Self::SqliteQuery => (2, None, "at least 2"),
            Self::SqliteValue => (3, Some(4), "3 or 4"),
            Self::CsvSumWhere | Self::CsvAvgWhere | Self::CsvCountWhere => (5, Some(5), "5"),
        }
    }

    /// Arity is validated before any file is touched, so malformed
    /// templates fail fast with the function name and expected count.
    fn check_arity(self, actual: usize) -> Result<(), QueryError> {
        let (min, max, expected) = self.arity();
        let within = actual >= min && max.is_none_or(|max| actual <= max);
        if within {
            Ok(())
        } else {
            Err(QueryError::Arity {
                function: self.name(),
                expected,
                actual,
            })
        }
    }
}

/// Options for the query engine.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Directory that relative artifact paths resolve against.
    pub base_dir: PathBuf,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
        }
    }
}

/// Evaluates query-function templates against generated artifacts.
///
/// The engine is stateless apart from its base directory: every call
/// re-opens and re-parses its file, because artifacts may be regenerated
/// between invocations and a stale read would corrupt scoring.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    base_dir: PathBuf,
}

impl QueryEngine {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            base_dir: options.base_dir,
        }
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self::new(QueryOptions {
            base_dir: base_dir.into(),
        })
    }

    /// Substitute every `{{fname:...}}` call in `text`.
    ///
    /// Fails closed: the first failing call aborts the whole evaluation,
    /// and the error names the call as written.
    pub fn evaluate(&self, text: &str, components: &ComponentSet) -> Result<String, QueryError> {
        let calls = scan_calls(text);
        if calls.is_empty() {
            return Ok(text.to_string());
        }
        debug!(calls = calls.len(), "evaluating template");

        let mut output = String::with_capacity(text.len());
        let mut last_end = 0;
        for call in &calls {
            let raw = &text[call.span.0..call.span.1];
            let result = self
                .eval_call(call, components)
                .map_err(|err| QueryError::Call {
                    call: raw.to_string(),
                    source: Box::new(err),
                })?;
            debug!(function = %call.name, result = %result, "function evaluated");
            output.push_str(&text[last_end..call.span.0]);
            output.push_str(&result);
            last_end = call.span.1;
        }
        output.push_str(&text[last_end..]);
        Ok(output)
    }

    fn eval_call(
        &self,
        call: &TemplateCall,
        components: &ComponentSet,
    ) -> Result<String, QueryError> {
        let function = Function::from_name(&call.name)
            .ok_or_else(|| QueryError::UnknownFunction(call.name.clone()))?;
        let args = resolve_target_args(&call.args, components)?;
        function.check_arity(args.len())?;
        self.execute(function, &args)
    }

    fn execute(&self, function: Function, args: &[String]) -> Result<String, QueryError> {
        match function {
            Function::FileLine => {
                text::file_line(&self.path_arg(&args[1]), parse_index(&args[0])?)
            }
            Function::FileWord => {
                text::file_word(&self.path_arg(&args[1]), parse_index(&args[0])?)
            }
            Function::FileLineCount => {
                Ok(text::file_line_count(&self.path_arg(&args[0]))?.to_string())
            }
            Function::FileWordCount => {
                Ok(text::file_word_count(&self.path_arg(&args[0]))?.to_string())
            }

            Function::CsvCell => table::cell(
                &self.path_arg(&args[2]),
                parse_index(&args[0])?,
                parse_index(&args[1])?,
            ),
            Function::CsvRow => table::row(&self.path_arg(&args[1]), parse_index(&args[0])?),
            Function::CsvColumn => table::column(&self.path_arg(&args[1]), &args[0]),
            Function::CsvValue => table::value(
                &self.path_arg(&args[2]),
                parse_index(&args[0])?,
                &args[1],
            ),
            Function::CsvSum => self.csv_aggregate(args, Aggregate::Sum),
            Function::CsvAvg => self.csv_aggregate(args, Aggregate::Avg),
            Function::CsvCount => self.csv_aggregate(args, Aggregate::Count),
            Function::CsvSumWhere => self.csv_aggregate_where(args, Aggregate::Sum),
            Function::CsvAvgWhere => self.csv_aggregate_where(args, Aggregate::Avg),
            Function::CsvCountWhere => self.csv_aggregate_where(args, Aggregate::Count),

            Function::SqliteQuery => {
                // SQL may itself contain colons; everything up to the final
                // argument is the verbatim statement.
                let sql = args[..args.len() - 1].join(":");
                let path = &args[args.len() - 1];
                sqlite::query_scalar(&self.path_arg(path), &sql)
            }
            Function::SqliteValue => {
                let row = parse_index(&args[0])?;
                let (table, path) = if args.len() == 4 {
                    (Some(args[2].as_str()), &args[3])
                } else {
                    (None, &args[2])
                };
                sqlite::table_value(&self.path_arg(path), row, &args[1], table)
            }

            Function::JsonPath | Function::JsonValue => {
                tree::value(&self.path_arg(&args[1]), TreeFormat::Json, &args[0])
            }
            Function::YamlPath | Function::YamlValue => {
                tree::value(&self.path_arg(&args[1]), TreeFormat::Yaml, &args[0])
            }
            Function::JsonCount => self.tree_count(args, TreeFormat::Json),
            Function::YamlCount => self.tree_count(args, TreeFormat::Yaml),
            Function::JsonKeys => self.tree_keys(args, TreeFormat::Json),
            Function::YamlKeys => self.tree_keys(args, TreeFormat::Yaml),
            Function::JsonSum => self.tree_aggregate(args, TreeFormat::Json, TreeAggregate::Sum),
            Function::JsonAvg => self.tree_aggregate(args, TreeFormat::Json, TreeAggregate::Avg),
            Function::JsonMax => self.tree_aggregate(args, TreeFormat::Json, TreeAggregate::Max),
            Function::JsonMin => self.tree_aggregate(args, TreeFormat::Json, TreeAggregate::Min),
            Function::JsonCollect => {
                self.tree_aggregate(args, TreeFormat::Json, TreeAggregate::Collect)
            }
            Function::YamlSum => self.tree_aggregate(args, TreeFormat::Yaml, TreeAggregate::Sum),
            Function::YamlAvg => self.tree_aggregate(args, TreeFormat::Yaml, TreeAggregate::Avg),
            Function::YamlMax => self.tree_aggregate(args, TreeFormat::Yaml, TreeAggregate::Max),
            Function::YamlMin => self.tree_aggregate(args, TreeFormat::Yaml, TreeAggregate::Min),
            Function::YamlCollect => {
                self.tree_aggregate(args, TreeFormat::Yaml, TreeAggregate::Collect)
            }
            Function::JsonCountWhere => {
                tree::count_where(&self.path_arg(&args[1]), TreeFormat::Json, &args[0])
            }
            Function::YamlCountWhere => {
                tree::count_where(&self.path_arg(&args[1]), TreeFormat::Yaml, &args[0])
            }
            Function::JsonFilter => {
                tree::filter(&self.path_arg(&args[1]), TreeFormat::Json, &args[0])
            }
            Function::YamlFilter => {
                tree::filter(&self.path_arg(&args[1]), TreeFormat::Yaml, &args[0])
            }

            Function::XpathValue => xml::value(&self.path_arg(&args[1]), &args[0]),
            Function::XpathAttr => xml::attribute(&self.path_arg(&args[1]), &args[0]),
            Function::XpathCount => xml::count(&self.path_arg(&args[1]), &args[0]),
            Function::XpathExists => xml::exists(&self.path_arg(&args[1]), &args[0]),
            Function::XpathCollect => xml::collect(&self.path_arg(&args[1]), &args[0]),
            Function::XpathSum => {
                xml::aggregate(&self.path_arg(&args[1]), &args[0], XmlAggregate::Sum)
            }
            Function::XpathAvg => {
                xml::aggregate(&self.path_arg(&args[1]), &args[0], XmlAggregate::Avg)
            }
            Function::XpathMax => {
                xml::aggregate(&self.path_arg(&args[1]), &args[0], XmlAggregate::Max)
            }
            Function::XpathMin => {
                xml::aggregate(&self.path_arg(&args[1]), &args[0], XmlAggregate::Min)
            }
        }
    }

    fn csv_aggregate(&self, args: &[String], op: Aggregate) -> Result<String, QueryError> {
        let result = table::aggregate(&self.path_arg(&args[1]), &args[0], op)?;
        Ok(format_f64(result))
    }

    fn csv_aggregate_where(&self, args: &[String], op: Aggregate) -> Result<String, QueryError> {
        let predicate = FilterPredicate::from_parts(&args[1], &args[2], &args[3])?;
        let result = table::aggregate_where(&self.path_arg(&args[4]), &args[0], &predicate, op)?;
        Ok(format_f64(result))
    }

    fn tree_count(&self, args: &[String], format: TreeFormat) -> Result<String, QueryError> {
        let (key_path, path) = split_optional_path(args);
        tree::count(&self.path_arg(path), format, key_path)
    }

    fn tree_keys(&self, args: &[String], format: TreeFormat) -> Result<String, QueryError> {
        let (key_path, path) = split_optional_path(args);
        tree::keys(&self.path_arg(path), format, key_path)
    }

    fn tree_aggregate(
        &self,
        args: &[String],
        format: TreeFormat,
        op: TreeAggregate,
    ) -> Result<String, QueryError> {
        tree::aggregate(&self.path_arg(&args[1]), format, &args[0], op)
    }

    fn path_arg(&self, raw: &str) -> PathBuf {
        let path = Path::new(raw);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

/// `*_count`/`*_keys` take `[keyPath:]path`: two arguments navigate first,
/// one argument inspects the document root.
fn split_optional_path(args: &[String]) -> (Option<&str>, &str) {
    if args.len() == 2 {
        (Some(args[0].as_str()), args[1].as_str())
    } else {
        (None, args[0].as_str())
    }
}

/// Replace `TARGET_FILE` / `TARGET_FILE[name]` arguments with resolved
/// component paths before dispatch.
fn resolve_target_args(
    args: &[String],
    components: &ComponentSet,
) -> Result<Vec<String>, QueryError> {
    args.iter()
        .map(|arg| {
            if arg == "TARGET_FILE" {
                Ok(components.resolve(None)?.to_string_lossy().into_owned())
            } else if let Some(name) = arg
                .strip_prefix("TARGET_FILE[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                Ok(components.resolve(Some(name))?.to_string_lossy().into_owned())
            } else {
                Ok(arg.clone())
            }
        })
        .collect()
}

fn parse_index(arg: &str) -> Result<usize, QueryError> {
    arg.parse::<usize>().map_err(|_| {
        QueryError::InvalidArgument(format!("'{arg}' is not a valid index"))
    })
}
