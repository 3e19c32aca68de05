/// Column names the framework manages on its own. Every emitter skips them.
pub const RESERVED_FIELDS: [&str; 4] = ["id", "created_at", "updated_at", "deleted_at"];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_FIELDS.contains(&name)
}

/// Result of parsing a field spec string: descriptors in declaration order,
/// plus anything the parser tolerated but wants the caller to know about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSpec {
    pub fields: Vec<FieldDescriptor>,
    pub warnings: Vec<String>,
}

impl FieldSpec {
    /// Fields that take part in emission (reserved names removed).
    pub fn emitted(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| !f.is_reserved())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    pub typ: FieldType,
    pub modifiers: Vec<Modifier>,
    pub foreign: Option<ForeignKey>,
}

impl FieldDescriptor {
    pub fn is_reserved(&self) -> bool {
        is_reserved(&self.name)
    }

    pub fn has(&self, modifier: &Modifier) -> bool {
        self.modifiers.contains(modifier)
    }

    /// Explicit `nullable`, or a foreign key whose delete action nulls it.
    pub fn is_nullable(&self) -> bool {
        self.has(&Modifier::Nullable)
            || self
                .foreign
                .as_ref()
                .is_some_and(|fk| fk.on_delete == Some(OnDelete::SetNull))
    }

    /// Last `default(...)` payload wins.
    pub fn default_value(&self) -> Option<&str> {
        self.modifiers.iter().rev().find_map(|m| match m {
            Modifier::Default(v) => Some(v.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Text,
    LongText,
    Integer,
    BigInteger,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    DateTime,
    Json,
    Email,
    Foreign,
    /// Anything else; passed through verbatim to the schema builder.
    Other(String),
}

impl FieldType {
    pub fn from_str(s: &str) -> Self {
        match s {
            "string" => Self::String,
            "text" => Self::Text,
            "longText" => Self::LongText,
            "integer" => Self::Integer,
            "bigInteger" => Self::BigInteger,
            "float" => Self::Float,
            "double" => Self::Double,
            "decimal" => Self::Decimal,
            "boolean" => Self::Boolean,
            "date" => Self::Date,
            "dateTime" | "datetime" => Self::DateTime,
            "json" => Self::Json,
            "email" => Self::Email,
            "foreign" => Self::Foreign,
            other => Self::Other(other.to_string()),
        }
    }

    /// Schema builder method name for this type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Text => "text",
            Self::LongText => "longText",
            Self::Integer => "integer",
            Self::BigInteger => "bigInteger",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "dateTime",
            Self::Json => "json",
            Self::Email => "email",
            Self::Foreign => "foreign",
            Self::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    Nullable,
    Required,
    Unique,
    Index,
    Default(String),
    Cascade,
    SetNull,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub table: String,
    pub column: String,
    pub on_delete: Option<OnDelete>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    SetNull,
}

impl OnDelete {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::SetNull => "set null",
        }
    }
}
