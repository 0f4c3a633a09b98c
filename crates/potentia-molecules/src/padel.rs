//! External PaDEL-Descriptor invocation.
//!
//! One blocking Java subprocess per request, isolated in its own
//! temporary directory so concurrent requests can never read each
//! other's intermediate files. The directory is removed when the
//! `TempDir` guard drops, on success and failure alike.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use potentia_common::config::PadelConfig;
use potentia_common::error::{PotencyError, Result};
use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

/// Named fingerprint columns read back from the tool's CSV output.
#[derive(Debug, Clone, Default)]
pub struct FingerprintRecord {
    columns: HashMap<String, f64>,
}

impl FingerprintRecord {
    pub fn from_columns(columns: Vec<(String, f64)>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Wrapper for the PaDEL-Descriptor jar.
pub struct PadelRunner {
    java_bin: PathBuf,
    jar_path: PathBuf,
    descriptor_types: PathBuf,
    timeout: Duration,
}

impl PadelRunner {
    pub fn new(config: &PadelConfig) -> Self {
        Self {
            java_bin: config.java_bin.clone(),
            jar_path: config.jar_path.clone(),
            descriptor_types: config.descriptor_types_path.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Compute PubChem structural fingerprints for one SMILES string.
    pub async fn run(&self, smiles: &str) -> Result<FingerprintRecord> {
        let workdir = tempfile::tempdir()?;
        let molecule_id = format!("MOL-{}", Uuid::new_v4().simple());
        let smi_path = workdir.path().join("molecule.smi");
        let out_path = workdir.path().join("descriptors_output.csv");

        // Single-row structure file: SMILES, tab, synthetic identifier.
        tokio::fs::write(&smi_path, format!("{smiles}\t{molecule_id}\n")).await?;

        info!(id = %molecule_id, "running PaDEL fingerprinter");
        let invocation = Command::new(&self.java_bin)
            .arg("-Xms1G")
            .arg("-Xmx1G")
            .arg("-Djava.awt.headless=true")
            .arg("-jar")
            .arg(&self.jar_path)
            .arg("-removesalt")
            .arg("-standardizenitro")
            .arg("-fingerprints")
            .arg("-descriptortypes")
            .arg(&self.descriptor_types)
            .arg("-dir")
            .arg(workdir.path())
            .arg("-file")
            .arg(&out_path)
            .arg("-2d")
            // A fired timeout drops the future; the child must die with it
            // or every timed-out request leaks a running JVM.
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, invocation)
            .await
            .map_err(|_| {
                PotencyError::DescriptorComputationFailed(format!(
                    "fingerprinting tool exceeded {}s timeout",
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| {
                PotencyError::DescriptorComputationFailed(format!(
                    "failed to launch fingerprinting tool: {e}"
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PotencyError::DescriptorComputationFailed(format!(
                "fingerprinting tool exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let content = tokio::fs::read_to_string(&out_path).await.map_err(|_| {
            PotencyError::DescriptorComputationFailed(
                "fingerprinting tool produced no output file".to_string(),
            )
        })?;

        let record = parse_fingerprint_csv(&content)?;
        debug!(id = %molecule_id, columns = record.len(), "fingerprints computed");
        Ok(record)
    }
}

/// Read the first data row of the tool's CSV, dropping the `Name`
/// identifier column.
fn parse_fingerprint_csv(content: &str) -> Result<FingerprintRecord> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();

    let record = reader
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| {
            PotencyError::DescriptorComputationFailed(
                "fingerprint output contains no data row".to_string(),
            )
        })?;

    let mut columns = Vec::with_capacity(headers.len());
    for (header, value) in headers.iter().zip(record.iter()) {
        if header == "Name" {
            continue;
        }
        let parsed: f64 = value.trim().parse().map_err(|_| {
            PotencyError::DescriptorComputationFailed(format!(
                "non-numeric value '{value}' in fingerprint column {header}"
            ))
        })?;
        columns.push((header.clone(), parsed));
    }

    Ok(FingerprintRecord::from_columns(columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tool_csv_and_drops_name_column() {
        let csv = "Name,PubchemFP12,PubchemFP19,PubchemFP20\nMOL-1,1,0,1\n";
        let record = parse_fingerprint_csv(csv).unwrap();
        assert_eq!(record.len(), 3);
        assert_eq!(record.get("PubchemFP12"), Some(1.0));
        assert_eq!(record.get("PubchemFP19"), Some(0.0));
        assert_eq!(record.get("Name"), None);
    }

    #[test]
    fn empty_output_is_an_error() {
        let err = parse_fingerprint_csv("Name,PubchemFP12\n").unwrap_err();
        assert!(matches!(err, PotencyError::DescriptorComputationFailed(_)));
    }

    #[test]
    fn non_numeric_cell_is_an_error() {
        let err = parse_fingerprint_csv("Name,PubchemFP12\nMOL-1,oops\n").unwrap_err();
        assert!(matches!(err, PotencyError::DescriptorComputationFailed(_)));
    }

    #[cfg(unix)]
    mod subprocess {
        use super::super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        /// Shell stand-in for the Java tool: finds the `-dir`/`-file`
        /// arguments, reads the structure file, and writes a CSV whose
        /// `Len` column is the SMILES length, so each invocation's output
        /// is traceable to its input.
        const STUB: &str = r#"#!/bin/sh
dir=""; out=""
while [ $# -gt 0 ]; do
  case "$1" in
    -dir) dir="$2"; shift 2 ;;
    -file) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
smiles=$(cut -f1 "$dir/molecule.smi")
printf 'Name,PubchemFP12,Len\n' > "$out"
printf 'MOL,1,%s\n' "${#smiles}" >> "$out"
"#;

        fn write_stub(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("fake-padel");
            std::fs::write(&path, body).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        fn runner_for(stub: PathBuf, timeout_secs: u64) -> PadelRunner {
            PadelRunner::new(&PadelConfig {
                java_bin: stub,
                jar_path: PathBuf::from("unused.jar"),
                descriptor_types_path: PathBuf::from("unused.xml"),
                timeout_secs,
            })
        }

        #[tokio::test]
        async fn runs_tool_and_reads_fingerprints() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner_for(write_stub(dir.path(), STUB), 10);

            let record = runner.run("CCO").await.unwrap();
            assert_eq!(record.get("PubchemFP12"), Some(1.0));
            assert_eq!(record.get("Len"), Some(3.0));
        }

        #[tokio::test]
        async fn concurrent_runs_do_not_cross_contaminate() {
            let dir = tempfile::tempdir().unwrap();
            let runner = runner_for(write_stub(dir.path(), STUB), 10);

            let (short, long) = tokio::join!(runner.run("CCO"), runner.run("CCCCCCCCCC"));
            assert_eq!(short.unwrap().get("Len"), Some(3.0));
            assert_eq!(long.unwrap().get("Len"), Some(10.0));
        }

        #[tokio::test]
        async fn nonzero_exit_is_descriptor_failure() {
            let dir = tempfile::tempdir().unwrap();
            let stub = write_stub(dir.path(), "#!/bin/sh\necho 'boom' >&2\nexit 3\n");
            let runner = runner_for(stub, 10);

            let err = runner.run("CCO").await.unwrap_err();
            assert!(matches!(err, PotencyError::DescriptorComputationFailed(_)));
            assert!(err.to_string().contains("boom"));
        }

        #[tokio::test]
        async fn missing_output_file_is_descriptor_failure() {
            let dir = tempfile::tempdir().unwrap();
            let stub = write_stub(dir.path(), "#!/bin/sh\nexit 0\n");
            let runner = runner_for(stub, 10);

            let err = runner.run("CCO").await.unwrap_err();
            assert!(matches!(err, PotencyError::DescriptorComputationFailed(_)));
        }

        #[tokio::test]
        async fn hung_tool_times_out_and_kills_the_child() {
            let dir = tempfile::tempdir().unwrap();
            let pid_path = dir.path().join("stub.pid");
            let stub = write_stub(
                dir.path(),
                &format!("#!/bin/sh\necho $$ > '{}'\nsleep 30\n", pid_path.display()),
            );
            let runner = runner_for(stub, 1);

            let err = runner.run("CCO").await.unwrap_err();
            assert!(err.to_string().contains("timeout"));

            let pid: i32 = std::fs::read_to_string(&pid_path)
                .unwrap()
                .trim()
                .parse()
                .unwrap();
            // Kill delivery and reaping are asynchronous; poll briefly.
            // A lingering zombie (state Z) counts as dead.
            let mut alive = true;
            for _ in 0..50 {
                match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
                    Err(_) => {
                        alive = false;
                        break;
                    }
                    Ok(stat) if stat.contains(") Z ") => {
                        alive = false;
                        break;
                    }
                    Ok(_) => {
                        tokio::time::sleep(std::time::Duration::from_millis(100)).await
                    }
                }
            }
            assert!(!alive, "hung subprocess survived the timeout");
        }
    }
}
