mod cli;

use std::process::ExitCode;

use clap::Parser as _;
use frase::loader::{self, LoadErrors};
use frase::render;
use frase::{Grammar, Lexicon, Parser, Sentence};

use crate::cli::Cli;

const INVALID: u8 = 1;
const LOAD_FAILED: u8 = 2;

fn load(cli: &Cli) -> Result<(Grammar, Lexicon), Vec<String>> {
    let messages = |errors: LoadErrors| errors.iter().map(ToString::to_string).collect::<Vec<_>>();

    let grammar = loader::load_grammar(&cli.grammar_path()).map_err(messages);
    let lexicon = loader::load_lexicon(&cli.lexicon_path()).map_err(messages);

    let (grammar, lexicon) = match (grammar, lexicon) {
        (Ok(grammar), Ok(lexicon)) => (grammar, lexicon),
        (grammar, lexicon) => {
            return Err(grammar.err().into_iter().chain(lexicon.err()).flatten().collect());
        }
    };

    let grammar = match &cli.start {
        Some(start) => grammar.with_start_symbol(start.as_str()).map_err(|e| vec![e.to_string()])?,
        None => grammar,
    };

    Ok((grammar, lexicon))
}

fn report_load_errors(cli: &Cli, errors: &[String]) {
    if cli.json {
        match render::error_json(&errors.join("\n")) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize error: {}", e),
        }
    } else {
        for error in errors {
            eprintln!("{}", error);
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let (grammar, lexicon) = match load(&cli) {
        Ok(loaded) => loaded,
        Err(errors) => {
            report_load_errors(&cli, &errors);
            return ExitCode::from(LOAD_FAILED);
        }
    };

    let parser = Parser::with_options(grammar, lexicon, cli.parser_options());
    let sentence = Sentence::new(cli.text());
    let report = parser.parse_sentence(&sentence);

    if cli.json {
        match render::to_json(&report, &sentence, parser.lexicon()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Could not serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", render::to_text(&report, &sentence, cli.metrics));
    }

    if report.is_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(INVALID)
    }
}
