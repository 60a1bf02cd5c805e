/// The database flavor handles the differences between placeholder syntaxes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flavor {
    #[default]
    Mysql,
    Postgresql,
    Sqlite,
}

impl Flavor {
    /// Renders the `n`-th (1-based) parameter placeholder.
    pub fn placeholder(self, n: usize) -> String {
        match self {
            Flavor::Mysql => "?".to_string(),
            Flavor::Postgresql => format!("${n}"),
            Flavor::Sqlite => format!("?{n}"),
        }
    }
}
