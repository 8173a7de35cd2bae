use std::path::PathBuf;

use kiln_core::{FileRules, ProjectFile};

/// Two-stage container build for archetypes that ship one.
pub struct Dockerfile {
    pub binary: String,
}

impl ProjectFile for Dockerfile {
    fn path(&self) -> PathBuf {
        PathBuf::from("Dockerfile")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        format!(
            r#"FROM rust:1.85-slim AS build
WORKDIR /app
COPY . .
RUN cargo build --release

FROM debian:bookworm-slim
COPY --from=build /app/target/release/{binary} /usr/local/bin/{binary}
CMD ["{binary}"]
"#,
            binary = self.binary
        )
    }
}
