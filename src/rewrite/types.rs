// Column type translation: Oracle type signatures to SQL Server types.
// Rules are tried in a fixed order and the first one that claims the
// signature wins; the zero-precision repair always runs last.

use std::fmt;

const FIXED_POINT: &[&str] = &["NUMBER", "NUMERIC", "DECIMAL", "DEC"];
const CHARACTER: &[&str] = &["VARCHAR2", "VARCHAR", "NVARCHAR2", "CHAR", "NCHAR"];
const DATE_TIME: &[&str] = &["DATE", "TIMESTAMP"];

/// Numeric modifiers attached to a source type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifiers {
    None,
    /// `VARCHAR2(50)`, `RAW(16)`, `TIMESTAMP(6)`.
    Size(u32),
    /// `NUMBER(10)` or `NUMBER(10,2)`; a missing scale is 0.
    Precision { precision: u32, scale: u32 },
    /// Parenthesised but not numeric, e.g. `NUMBER(*)`. Keeps the raw text.
    Unspecified(String),
}

/// An Oracle column type as written in the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSignature {
    pub name: String,
    pub modifiers: Modifiers,
}

impl TypeSignature {
    pub fn new(name: &str, modifiers: Modifiers) -> Self {
        Self {
            name: name.to_uppercase(),
            modifiers,
        }
    }

    // Parse a type such as `VARCHAR2(50 BYTE)`, `NUMBER(10,0)`, `LONG RAW`
    // or `TIMESTAMP(6) WITH LOCAL TIME ZONE`. Never fails: anything odd
    // lands in Modifiers::Unspecified or stays in the name.
    pub fn parse(text: &str) -> Self {
        let upper = text.trim().to_uppercase();
        let (head, args) = match upper.find('(') {
            Some(open) => {
                let close = upper[open..].find(')').map(|i| open + i);
                let inner = match close {
                    Some(close) => &upper[open + 1..close],
                    None => &upper[open + 1..],
                };
                (&upper[..open], Some(inner.to_string()))
            }
            None => (upper.as_str(), None),
        };

        let mut name = head.split_whitespace().collect::<Vec<_>>().join(" ");
        for suffix in [" WITH LOCAL TIME ZONE", " WITH TIME ZONE"] {
            if let Some(stripped) = name.strip_suffix(suffix) {
                name = stripped.to_string();
            }
        }

        let modifiers = match args {
            None => Modifiers::None,
            Some(inner) => parse_modifiers(&name, &inner),
        };
        Self::new(&name, modifiers)
    }

    fn is_fixed_point(&self) -> bool {
        FIXED_POINT.contains(&self.name.as_str())
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.modifiers {
            Modifiers::None => write!(f, "{}", self.name),
            Modifiers::Size(n) => write!(f, "{}({})", self.name, n),
            Modifiers::Precision { precision, scale } => {
                write!(f, "{}({},{})", self.name, precision, scale)
            }
            Modifiers::Unspecified(raw) => write!(f, "{}({})", self.name, raw),
        }
    }
}

// `50 BYTE` / `50 CHAR` carry length semantics we do not need.
fn parse_number(arg: &str) -> Option<u32> {
    arg.split_whitespace().next()?.parse().ok()
}

fn parse_modifiers(name: &str, inner: &str) -> Modifiers {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let numbers: Option<Vec<u32>> = parts.iter().map(|p| parse_number(p)).collect();
    let fixed_point = FIXED_POINT.contains(&name);
    match numbers.as_deref() {
        Some([p]) if fixed_point => Modifiers::Precision {
            precision: *p,
            scale: 0,
        },
        Some([n]) => Modifiers::Size(*n),
        Some([p, s]) => Modifiers::Precision {
            precision: *p,
            scale: *s,
        },
        _ => Modifiers::Unspecified(inner.trim().to_string()),
    }
}

/// Text length for NVARCHAR / VARBINARY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    Bounded(u32),
    Max,
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Bounded(n) => write!(f, "{}", n),
            Length::Max => f.write_str("MAX"),
        }
    }
}

/// A SQL Server column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlServerType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Decimal { precision: u32, scale: u32 },
    Real,
    Float,
    NVarChar(Length),
    NChar(u32),
    DateTime2,
    VarBinary(Length),
    /// A bare type name produced by the lookup table.
    Named(&'static str),
    /// Source signature kept as-is because nothing recognised it.
    Passthrough(TypeSignature),
}

impl fmt::Display for SqlServerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlServerType::Bit => f.write_str("BIT"),
            SqlServerType::TinyInt => f.write_str("TINYINT"),
            SqlServerType::SmallInt => f.write_str("SMALLINT"),
            SqlServerType::Int => f.write_str("INT"),
            SqlServerType::BigInt => f.write_str("BIGINT"),
            SqlServerType::Decimal { precision, scale } => {
                write!(f, "DECIMAL({},{})", precision, scale)
            }
            SqlServerType::Real => f.write_str("REAL"),
            SqlServerType::Float => f.write_str("FLOAT"),
            SqlServerType::NVarChar(len) => write!(f, "NVARCHAR({})", len),
            SqlServerType::NChar(n) => write!(f, "NCHAR({})", n),
            SqlServerType::DateTime2 => f.write_str("DATETIME2"),
            SqlServerType::VarBinary(len) => write!(f, "VARBINARY({})", len),
            SqlServerType::Named(name) => f.write_str(name),
            SqlServerType::Passthrough(sig) => write!(f, "{}", sig),
        }
    }
}

/// One entry of the ordered translation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRule {
    CharacterSize,
    FixedPoint,
    UnparametrizedNumeric,
    DateTime,
    RawBytes,
    LargeObject,
    Lookup,
}

impl TypeRule {
    pub const ORDER: [TypeRule; 7] = [
        TypeRule::CharacterSize,
        TypeRule::FixedPoint,
        TypeRule::UnparametrizedNumeric,
        TypeRule::DateTime,
        TypeRule::RawBytes,
        TypeRule::LargeObject,
        TypeRule::Lookup,
    ];

    pub fn apply(self, sig: &TypeSignature) -> Option<SqlServerType> {
        match self {
            TypeRule::CharacterSize => character_size(sig),
            TypeRule::FixedPoint => fixed_point(sig),
            TypeRule::UnparametrizedNumeric => {
                let unparametrized =
                    matches!(sig.modifiers, Modifiers::None | Modifiers::Unspecified(_));
                (sig.is_fixed_point() && unparametrized).then_some(SqlServerType::Decimal {
                    precision: 18,
                    scale: 0,
                })
            }
            TypeRule::DateTime => DATE_TIME
                .contains(&sig.name.as_str())
                .then_some(SqlServerType::DateTime2),
            TypeRule::RawBytes => raw_bytes(sig),
            TypeRule::LargeObject => match sig.name.as_str() {
                "CLOB" | "NCLOB" | "LONG" => Some(SqlServerType::NVarChar(Length::Max)),
                "BLOB" | "LONG RAW" => Some(SqlServerType::VarBinary(Length::Max)),
                _ => None,
            },
            TypeRule::Lookup => Some(lookup(sig)),
        }
    }
}

fn character_size(sig: &TypeSignature) -> Option<SqlServerType> {
    if !CHARACTER.contains(&sig.name.as_str()) {
        return None;
    }
    let national_fixed = matches!(sig.name.as_str(), "CHAR" | "NCHAR");
    match &sig.modifiers {
        Modifiers::None => None,
        Modifiers::Size(n) if national_fixed => Some(SqlServerType::NChar(*n)),
        Modifiers::Size(n) => Some(SqlServerType::NVarChar(Length::Bounded(*n))),
        _ if national_fixed => Some(SqlServerType::NChar(1)),
        _ => Some(SqlServerType::NVarChar(Length::Bounded(255))),
    }
}

fn fixed_point(sig: &TypeSignature) -> Option<SqlServerType> {
    if !sig.is_fixed_point() {
        return None;
    }
    let Modifiers::Precision { precision, scale } = sig.modifiers else {
        return None;
    };
    let target = match precision {
        0..=1 => SqlServerType::Bit,
        2..=3 => SqlServerType::TinyInt,
        4..=5 => SqlServerType::SmallInt,
        6..=10 => SqlServerType::Int,
        11..=19 => SqlServerType::BigInt,
        _ => SqlServerType::Decimal { precision, scale },
    };
    Some(target)
}

// RAW is stored as hex text: two characters per byte.
fn raw_bytes(sig: &TypeSignature) -> Option<SqlServerType> {
    if sig.name != "RAW" {
        return None;
    }
    let size = match sig.modifiers {
        Modifiers::Size(n) => n.saturating_mul(2),
        _ => 12,
    };
    Some(SqlServerType::NVarChar(Length::Bounded(size)))
}

fn lookup(sig: &TypeSignature) -> SqlServerType {
    match sig.name.as_str() {
        "VARCHAR2" | "VARCHAR" | "NVARCHAR2" => SqlServerType::Named("NVARCHAR"),
        "CHAR" | "NCHAR" => SqlServerType::Named("NCHAR"),
        "INTEGER" | "INT" => SqlServerType::Int,
        "SMALLINT" => SqlServerType::SmallInt,
        "FLOAT" | "BINARY_DOUBLE" | "DOUBLE PRECISION" => SqlServerType::Float,
        "BINARY_FLOAT" | "REAL" => SqlServerType::Real,
        _ => SqlServerType::Passthrough(sig.clone()),
    }
}

// Runs once after rule selection: a leading zero modifier becomes 1.
pub fn repair_zero_precision(target: SqlServerType) -> SqlServerType {
    match target {
        SqlServerType::Decimal {
            precision: 0,
            scale,
        } => SqlServerType::Decimal {
            precision: 1,
            scale,
        },
        SqlServerType::NVarChar(Length::Bounded(0)) => SqlServerType::NVarChar(Length::Bounded(1)),
        SqlServerType::VarBinary(Length::Bounded(0)) => {
            SqlServerType::VarBinary(Length::Bounded(1))
        }
        SqlServerType::NChar(0) => SqlServerType::NChar(1),
        SqlServerType::Passthrough(mut sig) => {
            sig.modifiers = match sig.modifiers {
                Modifiers::Size(0) => Modifiers::Size(1),
                Modifiers::Precision {
                    precision: 0,
                    scale,
                } => Modifiers::Precision {
                    precision: 1,
                    scale,
                },
                other => other,
            };
            SqlServerType::Passthrough(sig)
        }
        other => other,
    }
}

pub fn translate(sig: &TypeSignature) -> SqlServerType {
    let target = TypeRule::ORDER
        .iter()
        .find_map(|rule| rule.apply(sig))
        .unwrap_or_else(|| SqlServerType::Passthrough(sig.clone()));
    repair_zero_precision(target)
}
