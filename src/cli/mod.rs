//! Interface de linha de comando do docstore.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docstore - cache de documentos GraphQL parseados, limitado por tamanho.
#[derive(Parser, Debug)]
#[command(name = "docstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Arquivo de configuração.
    #[arg(short, long, default_value = "docstore.toml")]
    pub config: PathBuf,

    /// Modo verbose.
    #[arg(short, long)]
    pub verbose: bool,

    /// Modo silencioso.
    #[arg(short, long)]
    pub quiet: bool,

    /// Comando a executar.
    #[command(subcommand)]
    pub command: Commands,
}

/// Comandos disponíveis.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cria o arquivo de configuração padrão.
    Init {
        /// Diretório alvo (padrão: diretório atual).
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Parseia uma query e mostra seu hash e AST.
    Parse {
        /// Texto da query.
        query: String,
    },

    /// Armazena uma query num store embutido novo e mostra o tamanho ocupado.
    Inspect {
        /// Texto da query.
        query: String,
    },

    /// Reexecuta queries de um arquivo (uma por linha) pelo document store.
    Replay {
        /// Arquivo com uma query por linha.
        input: PathBuf,

        /// Desativa o cache independente da configuração.
        #[arg(long)]
        no_cache: bool,
    },

    /// Mostra a configuração efetiva.
    Config,

    /// Mostra versão.
    Version,
}
