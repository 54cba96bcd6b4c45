//! Term tables for dictionary extraction
//!
//! Each entry maps a normalised phrase (lowercase, single spaces, no
//! punctuation) to the canonical tag stored on the video.

pub(crate) const SERVICES: &[(&str, &str)] = &[
    ("lambda", "AWS Lambda"),
    ("s3", "Amazon S3"),
    ("dynamodb", "Amazon DynamoDB"),
    ("ec2", "Amazon EC2"),
    ("eks", "Amazon EKS"),
    ("ecs", "Amazon ECS"),
    ("fargate", "AWS Fargate"),
    ("bedrock", "Amazon Bedrock"),
    ("sagemaker", "Amazon SageMaker"),
    ("aurora", "Amazon Aurora"),
    ("rds", "Amazon RDS"),
    ("redshift", "Amazon Redshift"),
    ("kinesis", "Amazon Kinesis"),
    ("athena", "Amazon Athena"),
    ("glue", "AWS Glue"),
    ("cloudformation", "AWS CloudFormation"),
    ("cdk", "AWS CDK"),
    ("step functions", "AWS Step Functions"),
    ("eventbridge", "Amazon EventBridge"),
    ("api gateway", "Amazon API Gateway"),
    ("cloudwatch", "Amazon CloudWatch"),
    ("cloudfront", "Amazon CloudFront"),
    ("iam", "AWS IAM"),
    ("sqs", "Amazon SQS"),
    ("sns", "Amazon SNS"),
    ("opensearch", "Amazon OpenSearch Service"),
    ("q developer", "Amazon Q Developer"),
    ("kubernetes", "Kubernetes"),
];

pub(crate) const TOPICS: &[(&str, &str)] = &[
    ("machine learning", "Machine Learning"),
    ("generative ai", "Generative AI"),
    ("genai", "Generative AI"),
    ("large language model", "Generative AI"),
    ("llm", "Generative AI"),
    ("serverless", "Serverless"),
    ("security", "Security"),
    ("containers", "Containers"),
    ("observability", "Observability"),
    ("analytics", "Analytics"),
    ("data lake", "Analytics"),
    ("database", "Databases"),
    ("databases", "Databases"),
    ("networking", "Networking"),
    ("devops", "DevOps"),
    ("ci cd", "DevOps"),
    ("cost optimization", "Cost Optimization"),
    ("migration", "Migration"),
    ("streaming", "Streaming"),
    ("architecture", "Architecture"),
    ("microservices", "Architecture"),
    ("event driven", "Event-Driven Architecture"),
    ("sustainability", "Sustainability"),
    ("compliance", "Compliance"),
    ("resilience", "Resilience"),
];

pub(crate) const INDUSTRIES: &[(&str, &str)] = &[
    ("healthcare", "Healthcare"),
    ("life sciences", "Life Sciences"),
    ("financial services", "Financial Services"),
    ("fintech", "Financial Services"),
    ("banking", "Financial Services"),
    ("insurance", "Insurance"),
    ("retail", "Retail"),
    ("manufacturing", "Manufacturing"),
    ("automotive", "Automotive"),
    ("media", "Media & Entertainment"),
    ("gaming", "Games"),
    ("public sector", "Public Sector"),
    ("government", "Public Sector"),
    ("telecommunications", "Telecommunications"),
    ("telco", "Telecommunications"),
    ("energy", "Energy"),
    ("education", "Education"),
    ("travel", "Travel & Hospitality"),
];

/// Session-format phrases, checked in order
pub(crate) const SESSION_TYPES: &[(&str, &str)] = &[
    ("keynote", "keynote"),
    ("chalk talk", "chalk_talk"),
    ("builders session", "builders_session"),
    ("builder session", "builders_session"),
    ("workshop", "workshop"),
    ("lightning talk", "lightning_talk"),
    ("fireside chat", "interview"),
    ("interview", "interview"),
    ("breakout", "breakout"),
];

/// Level phrases, checked after session codes
pub(crate) const LEVEL_PHRASES: &[(&str, u32)] = &[
    ("getting started", 100),
    ("introduction to", 100),
    ("beginner", 100),
    ("deep dive", 300),
    ("advanced", 300),
    ("expert level", 400),
];

pub(crate) const STOPWORDS: &[&str] = &[
    "about", "actually", "after", "again", "also", "because", "been", "before", "being", "both",
    "came", "come", "could", "does", "doing", "done", "down", "each", "even", "every", "first",
    "from", "going", "gonna", "good", "great", "have", "having", "here", "into", "just", "kind",
    "know", "like", "look", "looking", "made", "make", "many", "maybe", "more", "most", "much",
    "need", "okay", "only", "other", "over", "pretty", "really", "right", "said", "same", "should",
    "some", "something", "sort", "still", "such", "sure", "take", "talk", "than", "thank", "thanks",
    "that", "their", "them", "then", "there", "these", "they", "thing", "things", "think", "this",
    "those", "through", "today", "very", "want", "well", "were", "what", "when", "where", "which",
    "while", "will", "with", "would", "yeah", "your",
];
