use passguard::utils::errors::PassguardError;

fn main() -> Result<(), PassguardError> {
    tokio::runtime::Builder::new_multi_thread()
        // Cap the number of blocking threads - heavy argon use can otherwise create an explosion
        // of hashing threads.
        .max_blocking_threads(num_cpus::get())
        .enable_all()
        .build()?
        .block_on(async {
            passguard::lib_main().await
        })
}
