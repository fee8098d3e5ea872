//! The wire names of the known [`WeatherDetails`](crate::WeatherDetails) fields.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Summary,
    Description,
    Icon,
}

/// How one known field is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: Field,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    /// Key used when the record is written out.
    pub output: &'static str,
    pub required: bool,
    pub omit_if_absent: bool,
}

impl FieldSpec {
    pub fn matches(&self, key: &str) -> bool {
        self.canonical == key || self.aliases.contains(&key)
    }
}

/// Known fields in output order.
pub static FIELDS: [FieldSpec; 4] = [
    FieldSpec {
        field: Field::Id,
        canonical: "id",
        aliases: &[],
        output: "id",
        required: false,
        omit_if_absent: true,
    },
    FieldSpec {
        field: Field::Summary,
        canonical: "weatherSummary",
        aliases: &["main"],
        output: "main",
        required: true,
        omit_if_absent: false,
    },
    FieldSpec {
        field: Field::Description,
        canonical: "weatherDescription",
        aliases: &["description"],
        output: "weatherDescription",
        required: true,
        omit_if_absent: false,
    },
    FieldSpec {
        field: Field::Icon,
        canonical: "iconPath",
        aliases: &["icon"],
        output: "icon",
        required: true,
        omit_if_absent: false,
    },
];

impl Field {
    pub fn spec(self) -> &'static FieldSpec {
        match self {
            Field::Id => &FIELDS[0],
            Field::Summary => &FIELDS[1],
            Field::Description => &FIELDS[2],
            Field::Icon => &FIELDS[3],
        }
    }

    pub fn canonical(self) -> &'static str {
        self.spec().canonical
    }
}

/// Find the known field `key` names, by canonical name or alias.
pub fn lookup(key: &str) -> Option<Field> {
    FIELDS.iter().find(|spec| spec.matches(key)).map(|spec| spec.field)
}

/// Whether `key` is read or written by a known field and so can't be an
/// additional property on output.
pub fn is_reserved(key: &str) -> bool {
    FIELDS.iter().any(|spec| spec.matches(key) || spec.output == key)
}
