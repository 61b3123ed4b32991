//! Dashboard HTML page

use sauceqa_common::report::escape_html;
use sauceqa_common::ReportInfo;

use crate::runs::{RunStatus, RunTicket, TRIGGERABLE};
use crate::server::{StatusInfo, TestInfo};

const TITLE: &str = "SauceQA Automation Dashboard";

pub fn render(
    status: &StatusInfo,
    reports: &[ReportInfo],
    info: &TestInfo,
    active: Option<&RunTicket>,
) -> String {
    let users: String = info
        .users
        .iter()
        .map(|u| {
            format!(
                "<tr><td><code>{}</code></td><td>{}</td></tr>\n",
                escape_html(u.username),
                escape_html(u.description)
            )
        })
        .collect();

    let report_rows = if reports.is_empty() {
        "<p class=\"muted\">No reports generated yet. Run some tests first.</p>".to_string()
    } else {
        let items: String = reports
            .iter()
            .map(|r| {
                format!(
                    "<li><a href=\"{path}\" target=\"_blank\">{name}</a><span class=\"muted\">{created} &middot; {kb} KB</span></li>\n",
                    path = escape_html(&r.path),
                    name = escape_html(&r.name),
                    created = escape_html(&r.created),
                    kb = r.size_kb,
                )
            })
            .collect();
        format!("<ul class=\"reports\">\n{}</ul>", items)
    };

    let buttons: String = TRIGGERABLE
        .iter()
        .map(|scope| {
            format!(
                "<button onclick=\"runTests('{scope}')\" data-endpoint=\"/api/run/{scope}\">Run {scope} tests</button>\n",
                scope = scope
            )
        })
        .collect();

    let active_run = match active {
        Some(ticket) => format!(
            "<p class=\"active\">Active run: <code>{}</code> ({}, {})</p>",
            ticket.id,
            ticket.scope,
            match &ticket.status {
                RunStatus::Launching => "launching".to_string(),
                RunStatus::Running { pid: Some(pid) } => format!("running, pid {}", pid),
                RunStatus::Running { pid: None } => "running".to_string(),
                RunStatus::Completed { exit_code } => format!("exit code {}", exit_code),
                RunStatus::Failed { error } => escape_html(error),
            }
        ),
        None => "<p class=\"muted\">No run in progress.</p>".to_string(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
        body {{ font-family: Arial, sans-serif; margin: 0; background: #f0f2f5; color: #222; }}
        header {{ background: #0066cc; color: white; padding: 24px 40px; }}
        main {{ max-width: 1100px; margin: 24px auto; display: grid; grid-template-columns: 1fr 1fr; gap: 20px; }}
        section {{ background: white; border-radius: 8px; padding: 20px; }}
        .stats {{ display: flex; gap: 30px; }}
        .stats .value {{ font-size: 1.6em; font-weight: bold; color: #0066cc; display: block; }}
        .muted {{ color: #777; margin-left: 8px; }}
        .reports li {{ margin: 6px 0; }}
        button {{ background: #0066cc; color: white; border: 0; padding: 10px 16px; border-radius: 4px; margin: 4px; cursor: pointer; }}
        table {{ border-collapse: collapse; width: 100%; }}
        td {{ padding: 6px; border-bottom: 1px solid #eee; }}
        #message {{ margin-top: 10px; font-weight: bold; }}
    </style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <p>{project} v{version} &middot; {dashboard_url}</p>
    </header>
    <main>
        <section>
            <h2>Status</h2>
            <div class="stats">
                <div><span class="value">{status}</span>Status</div>
                <div><span class="value">{test_cases}</span>Test cases</div>
                <div><span class="value">{requirements}</span>Requirements</div>
                <div><span class="value">{uptime}s</span>Uptime</div>
            </div>
            {active_run}
        </section>
        <section>
            <h2>Run Tests</h2>
            {buttons}
            <button onclick="generateReport()">Generate report</button>
            <div id="message"></div>
        </section>
        <section>
            <h2>Test Application</h2>
            <p><a href="{app_url}" target="_blank">{app_name}</a> &middot; password <code>{password}</code></p>
            <table>
                {users}
            </table>
        </section>
        <section>
            <h2>Recent Reports</h2>
            {report_rows}
        </section>
    </main>
    <script>
        function show(data) {{
            document.getElementById('message').textContent = data.message;
        }}
        function runTests(scope) {{
            fetch('/api/run/' + scope).then(r => r.json()).then(show);
        }}
        function generateReport() {{
            fetch('/api/generate-report', {{ method: 'POST' }})
                .then(r => r.json())
                .then(data => {{ show(data); if (data.success) location.reload(); }});
        }}
    </script>
</body>
</html>
"#,
        title = TITLE,
        project = escape_html(status.project),
        version = escape_html(status.version),
        dashboard_url = escape_html(&status.dashboard_url),
        status = escape_html(status.status),
        test_cases = status.test_cases,
        requirements = status.requirements,
        uptime = status.uptime as u64,
        active_run = active_run,
        buttons = buttons,
        app_url = escape_html(&info.url),
        app_name = escape_html(info.name),
        password = escape_html(info.password),
        users = users,
        report_rows = report_rows,
    )
}
