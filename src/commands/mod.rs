pub mod case;

/// Commands that read one field group of a case record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseQuery {
    Title,
    Description,
    Owner,
    Contract,
    Customer,
    Status,
    Rma,
    Device,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Case(CaseQuery),
    Feedback,
    Echo,
    Help,
    Test,
}

/// Every command in help-listing order. Selection scans in this order too,
/// so the first token found anywhere in the text wins.
pub const COMMANDS: [Command; 14] = [
    Command::Case(CaseQuery::Title),
    Command::Case(CaseQuery::Description),
    Command::Case(CaseQuery::Owner),
    Command::Case(CaseQuery::Contract),
    Command::Case(CaseQuery::Customer),
    Command::Case(CaseQuery::Status),
    Command::Case(CaseQuery::Rma),
    Command::Case(CaseQuery::Device),
    Command::Case(CaseQuery::Created),
    Command::Case(CaseQuery::Updated),
    Command::Feedback,
    Command::Echo,
    Command::Help,
    Command::Test,
];

pub const TEST_REPLY: &str = "This is a test message.";

impl Command {
    pub fn token(self) -> &'static str {
        match self {
            Command::Case(query) => match query {
                CaseQuery::Title => "/title",
                CaseQuery::Description => "/description",
                CaseQuery::Owner => "/owner",
                CaseQuery::Contract => "/contract",
                CaseQuery::Customer => "/customer",
                CaseQuery::Status => "/status",
                CaseQuery::Rma => "/rma",
                CaseQuery::Device => "/device",
                CaseQuery::Created => "/created",
                CaseQuery::Updated => "/updated",
            },
            Command::Feedback => "/feedback",
            Command::Echo => "/echo",
            Command::Help => "/help",
            Command::Test => "/test",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Command::Case(query) => match query {
                CaseQuery::Title => "Get title for TAC case.",
                CaseQuery::Description => "Get problem description for the TAC case.",
                CaseQuery::Owner => "Get case owner (TAC CSE) for TAC case.",
                CaseQuery::Contract => "Get contract number associated with the TAC case.",
                CaseQuery::Customer => "Get customer contact info for the TAC case.",
                CaseQuery::Status => "Get status and severity for the TAC case.",
                CaseQuery::Rma => "Get list of RMAs associated with TAC case.",
                CaseQuery::Device => {
                    "Get serial number and hostname for the device on which the TAC case was opened"
                }
                CaseQuery::Created => {
                    "Get the date on which the TAC case was created, and calculate the open duration"
                }
                CaseQuery::Updated => {
                    "Get the date on which the TAC case was last updated, and calculate the time since last update"
                }
            },
            Command::Feedback => {
                "Sends feedback to development team; use this to submit feature requests and bugs"
            }
            Command::Echo => "Reply back with the same message sent.",
            Command::Help => "Get help.",
            Command::Test => "Print test message.",
        }
    }
}

/// Pick the first command whose token appears anywhere in the text.
/// Falls back to help when nothing matches.
pub fn select(text: &str) -> Command {
    COMMANDS
        .iter()
        .copied()
        .find(|command| text.contains(command.token()))
        .unwrap_or(Command::Help)
}

/// The help listing: a short intro, then one line per command.
pub fn help_text() -> String {
    let mut message = String::from("Hello!  I understand the following commands.  \n");
    message.push_str(
        "If case number is provided with the command, I will use that case number. \
         If none is provided, I will look in the room name for a case number to use. \n",
    );
    for command in COMMANDS {
        message.push_str(&format!("* **{}**: {} \n", command.token(), command.help()));
    }
    message
}
