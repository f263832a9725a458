use std::fmt;

/// Types understood by the consumer, identified by their type OID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Boolean,
    Bytea,
    Int8,
    Int2,
    Int4,
    Text,
    Float4,
    Float8,
    Bpchar,
    Varchar,
    Date,
    Time,
    Timestamp,
    Numeric,
}

impl DataType {
    pub const fn oid(&self) -> u32 {
        match self {
            Self::Boolean => 16,
            Self::Bytea => 17,
            Self::Int8 => 20,
            Self::Int2 => 21,
            Self::Int4 => 23,
            Self::Text => 25,
            Self::Float4 => 700,
            Self::Float8 => 701,
            Self::Bpchar => 1042,
            Self::Varchar => 1043,
            Self::Date => 1082,
            Self::Time => 1083,
            Self::Timestamp => 1114,
            Self::Numeric => 1700,
        }
    }

    pub const fn from_oid(oid: u32) -> Option<Self> {
        Some(match oid {
            16 => Self::Boolean,
            17 => Self::Bytea,
            20 => Self::Int8,
            21 => Self::Int2,
            23 => Self::Int4,
            25 => Self::Text,
            700 => Self::Float4,
            701 => Self::Float8,
            1042 => Self::Bpchar,
            1043 => Self::Varchar,
            1082 => Self::Date,
            1083 => Self::Time,
            1114 => Self::Timestamp,
            1700 => Self::Numeric,
            _ => return None,
        })
    }

    /// If the consumer will treat values of this type as text.
    pub const fn is_string_like(&self) -> bool {
        matches!(self, Self::Text | Self::Varchar | Self::Bpchar)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Boolean => "boolean",
            Self::Bytea => "bytea",
            Self::Int8 => "bigint",
            Self::Int2 => "smallint",
            Self::Int4 => "integer",
            Self::Text => "text",
            Self::Float4 => "real",
            Self::Float8 => "double precision",
            Self::Bpchar => "character",
            Self::Varchar => "character varying",
            Self::Date => "date",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Numeric => "numeric",
        };
        f.write_str(s)
    }
}

/// A single resolved field handed to the consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputField {
    pub data_type: DataType,
    pub value: String,
}

impl OutputField {
    pub fn varchar(value: impl Into<String>) -> Self {
        OutputField {
            data_type: DataType::Varchar,
            value: value.into(),
        }
    }

    pub fn type_oid(&self) -> u32 {
        self.data_type.oid()
    }
}
