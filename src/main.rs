use docker_credential_acr::broker::LazyAzureTokenBroker;
use docker_credential_acr::cli::Runner;
use docker_credential_acr::{AcrHelper, HelperConfig, Logger};
use std::io::{self, Write};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = HelperConfig::from_env();
    let output = Logger::for_debug(config.debug);

    // Only `get` builds the Azure clients
    let broker = LazyAzureTokenBroker::new(config.clone(), output.clone());
    let helper = AcrHelper::new(broker, &config).with_output(output.clone());
    let runner = Runner::new(helper, output);

    let mut stdin = io::stdin().lock();
    let mut stdout = io::stdout().lock();
    let code = runner.run(std::env::args_os(), &mut stdin, &mut stdout).await;
    let _ = stdout.flush();
    drop(stdout);

    std::process::exit(code);
}
