//! Candidate field paths for each concept, across source API versions.
//!
//! New source versions are accommodated by adding paths here; the first path
//! that resolves to a value of the expected shape wins.

use serde_json::Value;

use super::coerce::as_i64;

/// One step into a JSON document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Object member by name.
    Key(&'static str),
    /// Array element whose `key` member equals `equals`.
    Find { key: &'static str, equals: i64 },
}

/// A path of segments from the draw object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static [Segment]);

impl FieldPath {
    /// Follow the path; `None` if any step is missing or the value is null.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;
        for segment in self.0 {
            current = match segment {
                Segment::Key(key) => current.get(key)?,
                Segment::Find { key, equals } => current
                    .as_array()?
                    .iter()
                    .find(|item| item.get(key).and_then(as_i64) == Some(*equals))?,
            };
        }
        (!current.is_null()).then_some(current)
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            match segment {
                Segment::Key(key) => write!(f, "{}", key)?,
                Segment::Find { key, equals } => write!(f, "[{}={}]", key, equals)?,
            }
        }
        Ok(())
    }
}

/// First path in `paths` whose value satisfies `accept`.
pub fn first_match<'a, F>(paths: &[FieldPath], root: &'a Value, accept: F) -> Option<&'a Value>
where
    F: Fn(&Value) -> bool,
{
    paths
        .iter()
        .filter_map(|path| path.resolve(root))
        .find(|value| accept(*value))
}

/// First member of `keys` present and non-null on `object`.
pub fn first_key<'a>(keys: &[&str], object: &'a Value) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .find(|value| !value.is_null())
}

/// Probe tables for every concept the normalizer extracts.
#[derive(Debug, Clone, Copy)]
pub struct SchemaProbes {
    pub contest: &'static [FieldPath],
    pub date: &'static [FieldPath],
    pub numbers: &'static [FieldPath],
    pub winner_list: &'static [FieldPath],
    pub accumulated: &'static [FieldPath],
    /// Member names inside one winner entry
    pub municipality: &'static [&'static str],
    pub state: &'static [&'static str],
    pub winner_count: &'static [&'static str],
}

impl SchemaProbes {
    /// Whether any top-level concept this table knows about is present.
    pub fn recognizes(&self, root: &Value) -> bool {
        [self.contest, self.date, self.numbers, self.winner_list]
            .iter()
            .any(|paths| paths.iter().any(|p| p.resolve(root).is_some()))
    }
}

impl Default for SchemaProbes {
    fn default() -> Self {
        DEFAULT_PROBES
    }
}

/// Paths seen across the community API and the official results service.
pub const DEFAULT_PROBES: SchemaProbes = SchemaProbes {
    contest: &[
        FieldPath(&[Segment::Key("concurso")]),
        FieldPath(&[Segment::Key("numero")]),
        FieldPath(&[Segment::Key("numeroDoConcurso")]),
    ],
    date: &[
        FieldPath(&[Segment::Key("data")]),
        FieldPath(&[Segment::Key("dataApuracao")]),
        FieldPath(&[Segment::Key("dataSorteio")]),
    ],
    numbers: &[
        FieldPath(&[Segment::Key("dezenas")]),
        FieldPath(&[Segment::Key("listaDezenas")]),
        FieldPath(&[Segment::Key("dezenasSorteadasOrdemSorteio")]),
        FieldPath(&[Segment::Key("dezenasOrdemSorteio")]),
        FieldPath(&[Segment::Key("numeros")]),
    ],
    winner_list: &[
        FieldPath(&[Segment::Key("localGanhadores")]),
        FieldPath(&[Segment::Key("listaMunicipioUFGanhadores")]),
        FieldPath(&[
            Segment::Key("rateio"),
            Segment::Find {
                key: "acertos",
                equals: 6,
            },
            Segment::Key("ganhadores_cidade"),
        ]),
    ],
    accumulated: &[
        FieldPath(&[Segment::Key("valorAcumuladoProximoConcurso")]),
        FieldPath(&[Segment::Key("valor_acumulado")]),
        FieldPath(&[Segment::Key("valorAcumulado")]),
    ],
    municipality: &["municipio", "cidade"],
    state: &["uf", "estado"],
    winner_count: &["quantidade", "ganhadores"],
};
