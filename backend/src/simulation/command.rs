//! Simulator command line assembly

/// `--max-depart-delay`: never drop vehicles whose departure is delayed
const MAX_DEPART_DELAY: &str = "-1";
/// `--waiting-time-memory`: seconds of accumulated waiting time kept per vehicle
const WAITING_TIME_MEMORY: &str = "1000";
/// `--time-to-teleport`: never teleport stuck vehicles
const TIME_TO_TELEPORT: &str = "-1";
/// `--no-warnings`
const NO_WARNINGS: &str = "true";

/// Command line for one simulator session
///
/// # Example
/// ```
/// use traffic_signal_core_rs::simulation::SumoCommand;
///
/// let cmd = SumoCommand::new("/usr/bin/sumo", "grid.net.xml", "grid.rou.xml", "grid.add.xml")
///     .seed(42)
///     .end_time(3600.0)
///     .build();
///
/// assert_eq!(cmd[0], "/usr/bin/sumo");
/// assert!(cmd.windows(2).any(|w| w[0] == "--seed" && w[1] == "42"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SumoCommand {
    binary: String,
    net_file: String,
    route_file: String,
    addition_file: String,
    seed: u32,
    end_time: f64,
}

impl SumoCommand {
    pub fn new(
        binary: impl Into<String>,
        net_file: impl Into<String>,
        route_file: impl Into<String>,
        addition_file: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            net_file: net_file.into(),
            route_file: route_file.into(),
            addition_file: addition_file.into(),
            seed: 1,
            end_time: 3600.0,
        }
    }

    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn end_time(mut self, end_time: f64) -> Self {
        self.end_time = end_time;
        self
    }

    /// Full argument vector, binary first
    pub fn build(&self) -> Vec<String> {
        let seed = self.seed.to_string();
        let end_time = self.end_time.to_string();
        [
            self.binary.as_str(),
            "--net-file",
            self.net_file.as_str(),
            "--route-files",
            self.route_file.as_str(),
            "--additional-files",
            self.addition_file.as_str(),
            "--max-depart-delay",
            MAX_DEPART_DELAY,
            "--waiting-time-memory",
            WAITING_TIME_MEMORY,
            "--time-to-teleport",
            TIME_TO_TELEPORT,
            "--no-warnings",
            NO_WARNINGS,
            "--seed",
            seed.as_str(),
            "--end",
            end_time.as_str(),
        ]
        .iter()
        .map(|arg| arg.to_string())
        .collect()
    }
}

/// Value following `flag` in a command line, if present
pub fn flag_value<'a>(command: &'a [String], flag: &str) -> Option<&'a str> {
    command
        .iter()
        .position(|arg| arg == flag)
        .and_then(|i| command.get(i + 1))
        .map(String::as_str)
}
