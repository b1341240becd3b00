//! # Database Chat Prompts
//!
//! Template text for the auto-execute database chat scene. The two locales are not
//! translations of each other: the English template is minimal and ships its own DDL,
//! the Chinese template spells out a numbered list of constraints.
//!
//! Placeholders use `{name}` and are substituted in a single pass, so braces inside
//! substituted values are left alone.

/// The scene definition line that opens the English system message.
pub const SCENE_DEFINE_EN: &str = "You are a database expert. ";

/// The scene definition line that opens the Chinese system message.
pub const SCENE_DEFINE_ZH: &str = "你是一个数据库专家. ";

/// The sentence the Chinese template asks the model to answer with when the schema
/// cannot support the question.
pub const INSUFFICIENT_SCHEMA_MESSAGE_ZH: &str = "提供的表结构信息不足以生成 sql 查询。";

/// The English system template.
///
/// Placeholders: `{user_input}`, `{response}`, `{table_info}`
pub const DEFAULT_TEMPLATE_EN: &str = r#"
<|begin_of_text|><|start_header_id|>user<|end_header_id|>

Generate a SQL query to answer this question: `{user_input}`
Keep the statement to exactly one legal SQL query.
{response}

DDL statements:
{table_info}
<|eot_id|><|start_header_id|>assistant<|end_header_id|>

The following SQL query best answers the question `{user_input}`:
```sql
"#;

/// The Chinese system template.
///
/// Placeholders: `{db_name}`, `{table_info}`, `{dialect}`, `{top_k}`, `{display_type}`,
/// `{user_input}`, `{response}`
pub const DEFAULT_TEMPLATE_ZH: &str = r#"
请根据用户选择的数据库和该库的部分可用表结构定义来回答用户问题.
数据库名:
    {db_name}
表结构定义:
    {table_info}

约束:
    1. 请根据用户问题理解用户意图(不区分大小写)，使用给出表结构定义创建一个语法正确的 {dialect} sql，如果不需要sql，则直接回答用户问题。
    2. 除非用户在问题中指定了他希望获得的具体数据行数，否则始终将查询限制为最多 {top_k} 个结果。
    3. 只能使用表结构信息中提供的表来生成 sql，如果无法根据提供的表结构中生成 sql ，请在 thoughts 中说：“提供的表结构信息不足以生成 sql 查询。” 并且不要返回 sql。禁止随意捏造信息。
    4. 请注意生成SQL时不要弄错表和列的关系。
    5. 请检查SQL的正确性，并保证正确的情况下优化查询性能。
    6. 请从如下给出的展示方式中选择最优的一种用以进行数据渲染，将类型名称放入返回要求格式的 display_type 参数值中，如果找不到最合适的则使用'Table'作为展示方式，可用数据展示方式如下: {display_type}
用户问题:
    {user_input}
请一步步思考并按照以下JSON格式回复：
      {response}
确保返回正确的json并且可以被标准JSON解析器解析.

"#;

/// The final human message of every turn.
pub const HUMAN_TEMPLATE: &str = "{user_input}";

/// The variable name of the history placeholder.
pub const CHAT_HISTORY_VAR: &str = "chat_history";

/// The schema the English template falls back to when the caller supplies none.
pub const WORKLOAD_DDL: &str = r#"CREATE TABLE IF NOT EXISTS "workload_runs" (
	"workload_run_id"	BIGINT NOT NULL, -- Primary Key of the table
	"platform"	TEXT NOT NULL, -- Also known as Microarchitecture. Always use ILIKE operator for this column
	"workload_name"	TEXT NOT NULL, -- Always use ILIKE operator, known as workload name
	"workload_category"	TEXT NOT NULL, -- Also known as Domain
	"workload_subcategory"	TEXT,
	"primary_kpi_name"	TEXT NOT NULL, -- Also known as kpi_metric
	"primary_kpi_value"	FLOAT, -- Also known as Value
	PRIMARY KEY("workload_run_id")
);

CREATE TABLE IF NOT EXISTS "software_configuration" (
	"workload_run_id"	BIGINT NOT NULL, -- References workload_runs
	"software_config_name"	TEXT NOT NULL, -- Also known as Software configuration or Ingredient
	"software_config_value"	TEXT, -- Value of software_config_name
	PRIMARY KEY("workload_run_id","software_config_name"),
	FOREIGN KEY("workload_run_id") REFERENCES "workload_runs"("workload_run_id")
);

CREATE TABLE IF NOT EXISTS "edp" ( -- Also known as Emon Events
	"workload_run_id"	BIGINT NOT NULL, -- References workload_runs
	"metric_name"	TEXT NOT NULL, -- Also known as emon metric, edp metric or edp event name. Always use ILIKE operator for this column. metric_package power is also called package power
	"metric_value"	FLOAT,
	PRIMARY KEY("workload_run_id","metric_name"),
	FOREIGN KEY("workload_run_id") REFERENCES "workload_runs"("workload_run_id")
);

CREATE TABLE IF NOT EXISTS "tuning_parameters" (
	"workload_run_id"	BIGINT NOT NULL, -- References workload_runs
	"tuning_parameter_name"	TEXT NOT NULL, -- Also known as Tuning parameter
	"tuning_parameter_value"	TEXT, -- Value of tuning_parameter_name
	PRIMARY KEY("workload_run_id","tuning_parameter_name"),
	FOREIGN KEY("workload_run_id") REFERENCES "workload_runs"("workload_run_id")
);

CREATE TABLE IF NOT EXISTS "instructions" (
	"workload_name"	TEXT NOT NULL, -- Also known as workload name
	"platform"	TEXT NOT NULL, -- Also known as microarchitecture
	"workload_category"	TEXT, -- Also known as Domain
	"release_version"	TEXT NOT NULL, -- Release version of the workload
	"instruction_name"	TEXT NOT NULL, -- Instruction captured during the workload run
	"instruction_frequency"	FLOAT NOT NULL, -- Total count of instruction_name in the workload run
	PRIMARY KEY("workload_name","platform","release_version","instruction_name")
);

CREATE TABLE IF NOT EXISTS "platform_info" (
	"workload_run_id"	BIGINT NOT NULL, -- References workload_runs
	"cpus"	INTEGER NOT NULL, -- Total number of CPUs
	"core_count"	INTEGER NOT NULL, -- Total number of cores in the CPU
	"core_frequency_ghz"	FLOAT NOT NULL, -- Frequency in GHz for the CPU
	"epb_bios"	TEXT, -- Also known as Bios version
	"hyperthreading"	BOOL, -- Enabled when true
	"l2c_size_mb"	FLOAT, -- Level 2 cache
	"llc_size_mb"	FLOAT, -- Last level cache
	"power"	TEXT,
	"snc_mode"	INTEGER, -- Sub numa cluster mode
	"sockets"	INTEGER,
	"uncore_frequency"	TEXT,
	"memory_speed_mt_s"	INTEGER, -- Memory speed in million transfers per second
	"workload_name"	TEXT,
	"workload_category"	TEXT, -- Also known as Domain
	"platform"	TEXT, -- Also known as microarchitecture
	PRIMARY KEY("workload_run_id"),
	FOREIGN KEY("workload_run_id") REFERENCES "workload_runs"("workload_run_id")
);"#;
