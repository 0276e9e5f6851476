//! Prompt templates and canned replies.
//!
//! Templates use `{name}` placeholders that are filled from a
//! [`PromptContext`] in a single pass, so text supplied by the user is never
//! itself scanned for placeholders.

use shared::settings::PromptStyle;
use shared::SystemMetadata;

/// Named values available to every template
#[derive(Clone, Debug)]
pub struct PromptContext<'a> {
    pub username: &'a str,
    pub hostname: &'a str,
    pub os_info: &'a str,
    pub ip_address: &'a str,
    pub timestamp: String,
    pub user_message: &'a str,
}

impl<'a> PromptContext<'a> {
    pub fn new(metadata: &'a SystemMetadata, user_message: &'a str) -> Self {
        Self {
            username: &metadata.username,
            hostname: &metadata.hostname,
            os_info: &metadata.os_info,
            ip_address: &metadata.ip_address,
            timestamp: metadata.collected_at_label(),
            user_message,
        }
    }

    fn lookup(&self, name: &str) -> Option<&str> {
        match name {
            "username" => Some(self.username),
            "hostname" => Some(self.hostname),
            "os_info" => Some(self.os_info),
            "ip_address" => Some(self.ip_address),
            "timestamp" => Some(&self.timestamp),
            "user_message" => Some(self.user_message),
            _ => None,
        }
    }
}

const STANDARD_TEMPLATE: &str = "\
You are AskForHelp, a PC hardware and software support assistant for the IT support team.

System Information:
- Username: {username}
- Hostname: {hostname}
- OS: {os_info}
- IP Address: {ip_address}
- Timestamp: {timestamp}

User Question: {user_message}

IMPORTANT RULES:
1. You ONLY answer questions about PC hardware and software issues
2. NEVER ask users to perform actions requiring admin rights
3. NEVER ask users to modify system files or settings
4. NEVER ask users to update software or drivers themselves
5. For ANY task requiring admin rights or system modification, ALWAYS guide them to create an IT support ticket
6. For non-PC questions, explain your scope limitation and guide them to submit an IT ticket

For PC hardware/software questions:
- Provide helpful troubleshooting steps that don't require admin rights
- Ask clarifying questions
- Suggest safe, non-invasive solutions
- For complex issues, guide them to create a ticket for further assistance

Response:";

const CONCISE_TEMPLATE: &str = "\
You are AskForHelp, a PC hardware and software support assistant.

User: {user_message}

Rules:
- Only PC hardware/software questions
- No admin rights instructions
- Guide to IT ticket for complex issues

Response:";

const EDUCATIONAL_TEMPLATE: &str = "\
You are AskForHelp, a PC hardware and software support assistant for the IT support team.

Your goal is to educate users about their PC issues while keeping them safe.

System Info:
- User: {username}
- Host: {hostname}
- OS: {os_info}

User Question: {user_message}

Guidelines:
1. Explain the issue in simple terms
2. Provide safe troubleshooting steps
3. Explain WHY certain actions require IT support
4. Guide to IT ticket when needed
5. Be educational but concise

Response:";

const URGENT_TEMPLATE: &str = "\
You are AskForHelp, a PC hardware and software support assistant.

URGENT ISSUE DETECTED: {user_message}

Immediate Actions:
1. Acknowledge the urgency
2. Explain why this needs immediate IT attention
3. Guide user to create IT ticket IMMEDIATELY
4. Do NOT provide troubleshooting steps
5. Emphasize the importance of professional assistance

Response:";

pub fn template_for(style: PromptStyle) -> &'static str {
    match style {
        PromptStyle::Standard => STANDARD_TEMPLATE,
        PromptStyle::Concise => CONCISE_TEMPLATE,
        PromptStyle::Educational => EDUCATIONAL_TEMPLATE,
        PromptStyle::Urgent => URGENT_TEMPLATE,
    }
}

/// Build the full prompt sent to the model.
pub fn build_prompt(style: PromptStyle, ctx: &PromptContext<'_>) -> String {
    render(template_for(style), |name| ctx.lookup(name))
}

/// Fill `{name}` placeholders. Unknown names are left as written.
pub fn render<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) if is_placeholder_name(&after[..close]) => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_placeholder_name(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Reply used when a message needs admin rights or a system change.
pub fn admin_required_reply(issue: &str) -> String {
    render(
        "I understand you're experiencing an issue involving {issue}. This requires administrative \
privileges to resolve. Please click the \"Generate IT Ticket\" button to create a support request, \
and our IT team will assist you with this issue.",
        |name| (name == "issue").then_some(issue),
    )
}

/// Reply used for severity topics (data loss, malware, ...).
pub fn urgent_reply() -> &'static str {
    "This appears to be an urgent issue. Please click \"Generate IT Ticket\" immediately to create \
a high-priority support request. Our IT team will respond as soon as possible."
}

/// Text shown at the top of a fresh or cleared chat.
pub fn welcome_message(metadata: &SystemMetadata) -> String {
    format!(
        "Welcome to AskForHelp!

I'm your local AI assistant for PC hardware and software support.

What I can help you with:
• PC hardware issues (hard drive, RAM, CPU, etc.)
• Software problems (operating system, applications, errors)
• Driver issues and updates
• System performance troubleshooting
• Generate IT support tickets

IMPORTANT RULES:
1. I can only answer questions about PC hardware and software
2. For ANY task requiring admin rights or system modification, I will guide you to create an IT support ticket

System Information Collected:
• Username: {}
• Hostname: {}
• OS: {}
• IP: {}

Type your PC-related question below or click \"Generate IT Ticket\" to create a support report.",
        metadata.username, metadata.hostname, metadata.os_info, metadata.ip_address
    )
}
