use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use mediflow_core::{
    config::data_dir_from_env_value, ClinicError, CoreConfig, NonEmptyText, Record, RecordStore,
    SortOutcome, WaitQueue,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod render;

#[derive(Parser)]
#[command(name = "mediflow")]
#[command(about = "MediFlow clinic patient intake CLI")]
struct Cli {
    /// Directory holding patients.txt and queue_log.txt (default: data)
    #[arg(long, env = "MEDIFLOW_DATA_DIR", global = true)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Fields of one patient record.
#[derive(Args, Clone, Debug)]
struct PatientArgs {
    /// Patient ID (e.g. P001)
    #[arg(long)]
    id: NonEmptyText,
    /// Full name
    #[arg(long)]
    name: NonEmptyText,
    /// Age in years
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=150))]
    age: u32,
    /// Condition or reason for visit
    #[arg(long, default_value = "")]
    condition: String,
    /// Priority: 1 = Critical, 2 = Urgent, 3 = Normal
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(i32).range(1..=3))]
    priority: i32,
    /// Admission date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,
}

impl PatientArgs {
    fn into_record(self) -> Record {
        let admission_date = self
            .date
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        Record::new(
            self.id.into_string(),
            self.name.into_string(),
            self.age,
            self.condition,
            self.priority,
            admission_date,
        )
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SortKey {
    Name,
    Priority,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a patient record
    Add(PatientArgs),
    /// Replace the record with the given ID
    Update {
        /// ID of the record to replace
        current_id: String,
        #[command(flatten)]
        patient: PatientArgs,
    },
    /// Delete a patient record
    Delete {
        /// Patient ID
        id: String,
    },
    /// Search patient records by ID or by name
    Search {
        #[arg(long, group = "key")]
        id: Option<String>,
        #[arg(long, group = "key")]
        name: Option<String>,
    },
    /// List all patient records
    List {
        /// Walk from the last record to the first
        #[arg(long)]
        reverse: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Sort patient records in place
    Sort {
        #[arg(value_enum)]
        key: SortKey,
    },
    /// Add a patient to the waiting queue
    Enqueue(PatientArgs),
    /// Add a copy of an existing patient record to the waiting queue
    Admit {
        /// Patient ID in the records
        id: String,
    },
    /// Process the next patient in the queue
    Next,
    /// Show the next patient without removing them
    Peek,
    /// Show the waiting queue
    Queue {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Both structures as loaded for one command run.
struct Session {
    cfg: CoreConfig,
    records: RecordStore,
    queue: WaitQueue,
}

impl Session {
    fn open(cfg: CoreConfig) -> anyhow::Result<Self> {
        cfg.ensure_data_dir()?;
        let records = RecordStore::load(&cfg.patients_file())
            .with_context(|| format!("loading {}", cfg.patients_file().display()))?;
        let queue = WaitQueue::load(&cfg.queue_file())
            .with_context(|| format!("loading {}", cfg.queue_file().display()))?;
        Ok(Self {
            cfg,
            records,
            queue,
        })
    }

    /// Writes both structures back. A failed write is reported and does not stop the other.
    fn save(&self) -> bool {
        let mut ok = true;
        if let Err(e) = self.records.persist(&self.cfg.patients_file()) {
            eprintln!("Error saving patient records: {}", e);
            ok = false;
        }
        if let Err(e) = self.queue.persist(&self.cfg.queue_file()) {
            eprintln!("Error saving queue: {}", e);
            ok = false;
        }
        ok
    }

    /// Runs one command. Returns whether anything was modified.
    fn run(&mut self, command: Commands) -> anyhow::Result<bool> {
        match command {
            Commands::Add(patient) => {
                let record = patient.into_record();
                let name = record.name.clone();
                self.records.insert(record);
                println!("Patient {} added to records.", name);
                Ok(true)
            }
            Commands::Update {
                current_id,
                patient,
            } => {
                if self.records.update(&current_id, patient.into_record()) {
                    println!("Patient {} updated.", current_id);
                    Ok(true)
                } else {
                    eprintln!("Patient not found: {}", current_id);
                    Ok(false)
                }
            }
            Commands::Delete { id } => {
                if self.records.delete(&id) {
                    println!("Patient {} deleted.", id);
                    Ok(true)
                } else {
                    eprintln!("Patient not found: {}", id);
                    Ok(false)
                }
            }
            Commands::Search { id, name } => {
                let found = match (id, name) {
                    (Some(id), _) => self.records.search_by_id(&id),
                    (None, Some(name)) => self.records.search_by_name(&name),
                    (None, None) => bail!("search needs --id or --name"),
                };
                match found {
                    Some(record) => print!("{}", render::record_detail(record)),
                    None => eprintln!("Patient not found."),
                }
                Ok(false)
            }
            Commands::List { reverse, json } => {
                let records: Vec<&Record> = if reverse {
                    self.records.display_reverse().collect()
                } else {
                    self.records.display_forward().collect()
                };
                if json {
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    print!("{}", render::records_table(&records));
                }
                Ok(false)
            }
            Commands::Sort { key } => {
                let outcome = match key {
                    SortKey::Name => self.records.sort_by_name(),
                    SortKey::Priority => self.records.sort_by_priority(),
                };
                match outcome {
                    SortOutcome::NotNeeded => {
                        println!("List has 0 or 1 patient. No sorting needed.");
                        Ok(false)
                    }
                    SortOutcome::Sorted { .. } => {
                        match key {
                            SortKey::Name => println!("Patients sorted by name (A-Z)."),
                            SortKey::Priority => println!(
                                "Patients sorted by priority (Critical -> Urgent -> Normal)."
                            ),
                        }
                        Ok(true)
                    }
                }
            }
            Commands::Enqueue(patient) => {
                let record = patient.into_record();
                println!(
                    "Patient {} added to queue (Priority: {}).",
                    record.name, record.priority
                );
                self.queue.enqueue(record);
                Ok(true)
            }
            Commands::Admit { id } => {
                let Some(record) = self.records.search_by_id(&id) else {
                    eprintln!("Patient not found: {}", id);
                    return Ok(false);
                };
                let record = record.clone();
                println!(
                    "Patient {} added to queue (Priority: {}).",
                    record.name, record.priority
                );
                self.queue.enqueue(record);
                Ok(true)
            }
            Commands::Next => match self.queue.dequeue() {
                Ok(record) => {
                    println!("Processing patient: {} (ID: {})", record.name, record.id);
                    Ok(true)
                }
                Err(ClinicError::EmptyQueue) => {
                    eprintln!("Queue is empty!");
                    Ok(false)
                }
                Err(e) => Err(e.into()),
            },
            Commands::Peek => {
                match self.queue.peek() {
                    Ok(record) => print!("{}", render::record_detail(record)),
                    Err(_) => eprintln!("Queue is empty!"),
                }
                Ok(false)
            }
            Commands::Queue { json } => {
                if json {
                    let records: Vec<&Record> = self.queue.iter().collect();
                    println!("{}", serde_json::to_string_pretty(&records)?);
                } else {
                    print!("{}", render::queue_table(&self.queue));
                }
                Ok(false)
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mediflow=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'mediflow --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::new(data_dir_from_env_value(cli.data_dir))?;
    let mut session = Session::open(cfg)?;

    if session.run(command)? && !session.save() {
        std::process::exit(1);
    }

    Ok(())
}
