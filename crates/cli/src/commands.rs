//! Line-oriented command protocol.
//!
//! A line is `<command> <arg1>,<arg2>,...`: the command name ends at the
//! first space and the remainder is split on commas.

use std::fmt;

use common::{InvoiceId, ItemId};
use domain::{DomainError, Invoice, InvoiceService, InvoiceStorage};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

const NAME_DELIMITER: char = ' ';
const ARGS_DELIMITER: char = ',';
const HELP_NAME_WIDTH: usize = 25;

pub const PROMPT: &str = "> ";
pub const GREETING: &str = "Welcome to invoice.\nType \"help\" for more information.\n";
pub const FAREWELL: &str = "\nBye!\n";

/// Name, argument synopsis and description of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub args: &'static str,
    pub description: &'static str,
}

impl CommandSpec {
    pub fn usage(&self) -> String {
        if self.args.is_empty() {
            self.name.to_string()
        } else {
            format!("{} {}", self.name, self.args)
        }
    }
}

/// Every command, in help order.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "create",
        args: "<customer name>",
        description: "Create a new invoice.",
    },
    CommandSpec {
        name: "view",
        args: "<invoice id>",
        description: "Show an invoice.",
    },
    CommandSpec {
        name: "issue",
        args: "<invoice id>",
        description: "Issue an open invoice.",
    },
    CommandSpec {
        name: "pay",
        args: "<invoice id>",
        description: "Mark an issued invoice as paid.",
    },
    CommandSpec {
        name: "cancel",
        args: "<invoice id>",
        description: "Cancel an open or issued invoice.",
    },
    CommandSpec {
        name: "add-item",
        args: "<invoice id>,<product name>,<price>,<qty>",
        description: "Add an item to an open invoice.",
    },
    CommandSpec {
        name: "delete-item",
        args: "<invoice id>,<item id>",
        description: "Delete an item from an open invoice.",
    },
    CommandSpec {
        name: "update-customer",
        args: "<invoice id>,<customer name>",
        description: "Change the customer of an open invoice.",
    },
    CommandSpec {
        name: "help",
        args: "",
        description: "Print this help message.",
    },
    CommandSpec {
        name: "exit",
        args: "",
        description: "Exit invoice.",
    },
];

/// Renders the help listing, one `name  description` line per command.
pub fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|spec| {
            format!(
                "{:<width$}{}\n",
                spec.name,
                spec.description,
                width = HELP_NAME_WIDTH
            )
        })
        .collect()
}

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create {
        customer_name: String,
    },
    View {
        id: InvoiceId,
    },
    Issue {
        id: InvoiceId,
    },
    Pay {
        id: InvoiceId,
    },
    Cancel {
        id: InvoiceId,
    },
    AddItem {
        id: InvoiceId,
        product_name: String,
        price: i64,
        qty: i64,
    },
    DeleteItem {
        id: InvoiceId,
        item_id: ItemId,
    },
    UpdateCustomer {
        id: InvoiceId,
        customer_name: String,
    },
    Help,
    Exit,
}

/// Errors for lines that do not form a runnable command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unknown command {0:?} entered.")]
    UnknownCommand(String),

    /// Wrong number of arguments, or an empty one.
    #[error("usage: {0}")]
    Usage(String),

    #[error("{field} must be a whole number, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

impl Command {
    /// Parses one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(NAME_DELIMITER) {
            Some((name, rest)) => (name, Some(rest)),
            None => (line, None),
        };
        let spec = COMMANDS
            .iter()
            .find(|spec| spec.name == name)
            .ok_or_else(|| ParseError::UnknownCommand(name.to_string()))?;

        let args: Vec<&str> = rest
            .map(|rest| rest.split(ARGS_DELIMITER).map(str::trim).collect())
            .unwrap_or_default();
        let usage = || ParseError::Usage(spec.usage());
        if args.iter().any(|arg| arg.is_empty()) {
            return Err(usage());
        }

        let command = match (spec.name, args.as_slice()) {
            ("help", _) => Command::Help,
            ("exit", _) => Command::Exit,
            ("create", [customer_name]) => Command::Create {
                customer_name: customer_name.to_string(),
            },
            ("view", [id]) => Command::View { id: (*id).into() },
            ("issue", [id]) => Command::Issue { id: (*id).into() },
            ("pay", [id]) => Command::Pay { id: (*id).into() },
            ("cancel", [id]) => Command::Cancel { id: (*id).into() },
            ("add-item", [id, product_name, price, qty]) => Command::AddItem {
                id: (*id).into(),
                product_name: product_name.to_string(),
                price: parse_number("price", price)?,
                qty: parse_number("qty", qty)?,
            },
            ("delete-item", [id, item_id]) => Command::DeleteItem {
                id: (*id).into(),
                item_id: (*item_id).into(),
            },
            ("update-customer", [id, customer_name]) => Command::UpdateCustomer {
                id: (*id).into(),
                customer_name: customer_name.to_string(),
            },
            _ => return Err(usage()),
        };

        Ok(Some(command))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::View { .. } => "view",
            Command::Issue { .. } => "issue",
            Command::Pay { .. } => "pay",
            Command::Cancel { .. } => "cancel",
            Command::AddItem { .. } => "add-item",
            Command::DeleteItem { .. } => "delete-item",
            Command::UpdateCustomer { .. } => "update-customer",
            Command::Help => "help",
            Command::Exit => "exit",
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<i64, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// What the front end does after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Print the text (possibly empty) and prompt again.
    Output(String),
    /// Stop reading input.
    Exit,
}

/// Command interpreter over an invoice service.
pub struct Cli<S: InvoiceStorage> {
    service: InvoiceService<S>,
}

impl<S: InvoiceStorage> Cli<S> {
    pub fn new(service: InvoiceService<S>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &InvoiceService<S> {
        &self.service
    }

    /// Greets, then handles lines from `input` until `exit` or end of input.
    pub async fn run<R, W>(&self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(GREETING.as_bytes()).await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match self.handle_line(&line).await {
                Reply::Exit => break,
                Reply::Output(text) => output.write_all(text.as_bytes()).await?,
            }
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
        }

        output.write_all(FAREWELL.as_bytes()).await?;
        output.flush().await
    }

    /// Parses and runs one input line.
    pub async fn handle_line(&self, line: &str) -> Reply {
        match Command::parse(line) {
            Ok(None) => Reply::Output(String::new()),
            Ok(Some(Command::Exit)) => Reply::Exit,
            Ok(Some(command)) => Reply::Output(self.execute(command).await),
            Err(err @ ParseError::InvalidNumber { .. }) => Reply::Output(format!("error: {err}\n")),
            Err(err) => Reply::Output(format!("{err}\n")),
        }
    }

    /// Runs a parsed command and renders its outcome.
    #[tracing::instrument(skip(self, command), fields(command = command.name()))]
    pub async fn execute(&self, command: Command) -> String {
        metrics::counter!("cli_commands_total", "command" => command.name()).increment(1);

        match self.dispatch(command).await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(error = %err, "command failed");
                format!("error: {err}\n")
            }
        }
    }

    async fn dispatch(&self, command: Command) -> Result<String, DomainError> {
        let text = match command {
            Command::Create { customer_name } => {
                let invoice = self.service.create_invoice(&customer_name).await?;
                format!("Created invoice {}\n", invoice.id())
            }
            Command::View { id } => {
                let invoice = self
                    .service
                    .view_invoice(&id)
                    .await?
                    .ok_or(DomainError::NotFound(id))?;
                InvoiceView(&invoice).to_string()
            }
            Command::Issue { id } => {
                self.service.issue_invoice(&id).await?;
                format!("Issued invoice {id}\n")
            }
            Command::Pay { id } => {
                self.service.pay_invoice(&id).await?;
                format!("Paid invoice {id}\n")
            }
            Command::Cancel { id } => {
                self.service.cancel_invoice(&id).await?;
                format!("Canceled invoice {id}\n")
            }
            Command::AddItem {
                id,
                product_name,
                price,
                qty,
            } => {
                let item = self
                    .service
                    .add_invoice_item(&id, &product_name, price, qty)
                    .await?;
                format!("Added item {} to invoice {id}\n", item.id)
            }
            Command::DeleteItem { id, item_id } => {
                self.service.delete_invoice_item(&id, &item_id).await?;
                format!("Deleted item {item_id} from invoice {id}\n")
            }
            Command::UpdateCustomer { id, customer_name } => {
                self.service
                    .update_invoice_customer(&id, &customer_name)
                    .await?;
                format!("Updated customer of invoice {id}\n")
            }
            Command::Help => help_text(),
            Command::Exit => String::new(),
        };
        Ok(text)
    }
}

/// An amount in cents, shown as `units.cents`. `None` is a total that
/// overflowed.
struct Amount(Option<i64>);

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(cents) => write!(f, "{}.{:02}", cents / 100, cents % 100),
            None => write!(f, "overflow"),
        }
    }
}

/// Multi-line rendering of an invoice for `view`.
struct InvoiceView<'a>(&'a Invoice);

impl fmt::Display for InvoiceView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let invoice = self.0;

        writeln!(f, "Invoice {}", invoice.id())?;
        writeln!(f, "  Customer:   {}", invoice.customer_name())?;
        writeln!(f, "  Status:     {}", invoice.status())?;
        match invoice.issue_date() {
            Some(date) => writeln!(f, "  Issue date: {}", date.to_rfc3339())?,
            None => writeln!(f, "  Issue date: -")?,
        }
        writeln!(f, "  Created:    {}", invoice.created_at().to_rfc3339())?;
        writeln!(f, "  Updated:    {}", invoice.updated_at().to_rfc3339())?;
        writeln!(f, "  Items:")?;
        if invoice.items().is_empty() {
            writeln!(f, "    (none)")?;
        }
        for item in invoice.items() {
            writeln!(
                f,
                "    {}  {}  {} x {} = {}",
                item.id,
                item.product_name,
                item.qty,
                Amount(Some(item.price)),
                Amount(item.total())
            )?;
        }
        writeln!(f, "  Total:      {}", Amount(invoice.total()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_argument_commands() {
        assert_eq!(
            Command::parse("create John Doe").unwrap(),
            Some(Command::Create {
                customer_name: "John Doe".to_string()
            })
        );
        assert_eq!(
            Command::parse("pay 123").unwrap(),
            Some(Command::Pay { id: "123".into() })
        );
    }

    #[test]
    fn parses_comma_separated_arguments() {
        assert_eq!(
            Command::parse("add-item 123,Pen,123,2").unwrap(),
            Some(Command::AddItem {
                id: "123".into(),
                product_name: "Pen".to_string(),
                price: 123,
                qty: 2,
            })
        );
        assert_eq!(
            Command::parse("update-customer 123, Jane Roe").unwrap(),
            Some(Command::UpdateCustomer {
                id: "123".into(),
                customer_name: "Jane Roe".to_string(),
            })
        );
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(Command::parse("   ").unwrap(), None);
    }

    #[test]
    fn unknown_command_is_quoted() {
        let err = Command::parse("refund 1").unwrap_err();
        assert_eq!(err.to_string(), "Unknown command \"refund\" entered.");
    }

    #[test]
    fn wrong_argument_count_reports_usage() {
        let err = Command::parse("delete-item 123").unwrap_err();
        assert_eq!(err.to_string(), "usage: delete-item <invoice id>,<item id>");

        let err = Command::parse("view").unwrap_err();
        assert_eq!(err.to_string(), "usage: view <invoice id>");

        let err = Command::parse("view 1,2").unwrap_err();
        assert!(matches!(err, ParseError::Usage(_)));
    }

    #[test]
    fn empty_argument_reports_usage() {
        let err = Command::parse("add-item 1,,3,4").unwrap_err();
        assert!(matches!(err, ParseError::Usage(_)));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let err = Command::parse("add-item 1,Pen,abc,2").unwrap_err();
        assert_eq!(err.to_string(), "price must be a whole number, got \"abc\"");
    }

    #[test]
    fn negative_numbers_parse_for_validation_downstream() {
        let command = Command::parse("add-item 1,Pen,-5,0").unwrap().unwrap();
        assert!(matches!(command, Command::AddItem { price: -5, qty: 0, .. }));
    }

    #[test]
    fn help_lists_commands_in_order_with_padded_names() {
        let help = help_text();
        let lines: Vec<&str> = help.lines().collect();

        assert_eq!(lines.len(), COMMANDS.len());
        assert_eq!(lines[0], format!("{:<25}{}", "create", "Create a new invoice."));
        assert!(lines[8].starts_with("help"));
        assert_eq!(lines[9], format!("{:<25}{}", "exit", "Exit invoice."));
    }

    #[test]
    fn amounts_render_with_two_decimals() {
        assert_eq!(Amount(Some(246)).to_string(), "2.46");
        assert_eq!(Amount(Some(5)).to_string(), "0.05");
        assert_eq!(Amount(Some(100)).to_string(), "1.00");
        assert_eq!(Amount(None).to_string(), "overflow");
    }
}
