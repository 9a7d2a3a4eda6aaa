use crate::seed::{run_seeder, Seeder};
use crate::seeds::{
    attendance_location::AttendanceLocationSeeder, violation_type::ViolationTypeSeeder,
};
use util::config::AppConfig;

mod seed;
mod seeds;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let (log_file, log_to_stdout) = {
        let cfg = AppConfig::global();
        (cfg.log_file.clone(), cfg.log_to_stdout)
    };
    let _log_guard = util::logger::init_logging(&log_file, log_to_stdout);

    let db = db::connect().await;

    for (seeder, name) in [
        (
            Box::new(ViolationTypeSeeder) as Box<dyn Seeder + Send + Sync>,
            "ViolationType",
        ),
        (Box::new(AttendanceLocationSeeder), "AttendanceLocation"),
    ] {
        run_seeder(&*seeder, name, &db).await;
    }
}
