//! Wire token table.
//!
//! Every command name and literal option keyword the builders emit lives
//! here, so a grammar change touches one place.

macro_rules! token_table {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Exact token sent on the wire.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

token_table! {
    /// Module command names.
    CommandName {
        // Time series
        TsCreate => "TS.CREATE",
        TsAlter => "TS.ALTER",
        TsAdd => "TS.ADD",
        TsMAdd => "TS.MADD",
        TsIncrBy => "TS.INCRBY",
        TsDecrBy => "TS.DECRBY",
        TsDel => "TS.DEL",
        TsCreateRule => "TS.CREATERULE",
        TsDeleteRule => "TS.DELETERULE",
        TsGet => "TS.GET",
        TsMGet => "TS.MGET",
        TsRange => "TS.RANGE",
        TsRevRange => "TS.REVRANGE",
        TsMRange => "TS.MRANGE",
        TsMRevRange => "TS.MREVRANGE",
        TsQueryIndex => "TS.QUERYINDEX",
        TsInfo => "TS.INFO",
        // Bloom filter
        BfReserve => "BF.RESERVE",
        BfAdd => "BF.ADD",
        BfMAdd => "BF.MADD",
        BfExists => "BF.EXISTS",
        BfMExists => "BF.MEXISTS",
        BfInsert => "BF.INSERT",
        BfInfo => "BF.INFO",
        // Cuckoo filter
        CfReserve => "CF.RESERVE",
        CfAdd => "CF.ADD",
        CfAddNx => "CF.ADDNX",
        CfInsert => "CF.INSERT",
        CfInsertNx => "CF.INSERTNX",
        CfExists => "CF.EXISTS",
        CfMExists => "CF.MEXISTS",
        CfDel => "CF.DEL",
        CfCount => "CF.COUNT",
        CfInfo => "CF.INFO",
        // Count-min sketch
        CmsInitByDim => "CMS.INITBYDIM",
        CmsInitByProb => "CMS.INITBYPROB",
        CmsIncrBy => "CMS.INCRBY",
        CmsQuery => "CMS.QUERY",
        CmsMerge => "CMS.MERGE",
        CmsInfo => "CMS.INFO",
        // Top-K
        TopKReserve => "TOPK.RESERVE",
        TopKAdd => "TOPK.ADD",
        TopKIncrBy => "TOPK.INCRBY",
        TopKQuery => "TOPK.QUERY",
        TopKCount => "TOPK.COUNT",
        TopKList => "TOPK.LIST",
        TopKInfo => "TOPK.INFO",
        // t-digest
        TDigestCreate => "TDIGEST.CREATE",
        TDigestReset => "TDIGEST.RESET",
        TDigestAdd => "TDIGEST.ADD",
        TDigestMerge => "TDIGEST.MERGE",
        TDigestQuantile => "TDIGEST.QUANTILE",
        TDigestCdf => "TDIGEST.CDF",
        TDigestRank => "TDIGEST.RANK",
        TDigestRevRank => "TDIGEST.REVRANK",
        TDigestByRank => "TDIGEST.BYRANK",
        TDigestByRevRank => "TDIGEST.BYREVRANK",
        TDigestMin => "TDIGEST.MIN",
        TDigestMax => "TDIGEST.MAX",
        TDigestTrimmedMean => "TDIGEST.TRIMMED_MEAN",
        TDigestInfo => "TDIGEST.INFO",
        // JSON
        JsonSet => "JSON.SET",
        JsonGet => "JSON.GET",
        JsonMGet => "JSON.MGET",
        JsonDel => "JSON.DEL",
        JsonType => "JSON.TYPE",
        JsonArrAppend => "JSON.ARRAPPEND",
        JsonArrIndex => "JSON.ARRINDEX",
        JsonNumIncrBy => "JSON.NUMINCRBY",
        // Graph
        GraphQuery => "GRAPH.QUERY",
        GraphRoQuery => "GRAPH.RO_QUERY",
        GraphDelete => "GRAPH.DELETE",
        GraphList => "GRAPH.LIST",
    }
}

impl CommandName {
    /// Read-only commands that address many keys through a filter and may
    /// be answered by any shard of a clustered deployment.
    pub const fn is_read_only_multi_key(&self) -> bool {
        matches!(
            self,
            CommandName::TsMGet
                | CommandName::TsMRange
                | CommandName::TsMRevRange
                | CommandName::TsQueryIndex
        )
    }
}

token_table! {
    /// Literal option keywords.
    Keyword {
        Retention => "RETENTION",
        ChunkSize => "CHUNK_SIZE",
        Encoding => "ENCODING",
        DuplicatePolicy => "DUPLICATE_POLICY",
        OnDuplicate => "ON_DUPLICATE",
        Labels => "LABELS",
        Timestamp => "TIMESTAMP",
        Aggregation => "AGGREGATION",
        Latest => "LATEST",
        FilterByTs => "FILTER_BY_TS",
        FilterByValue => "FILTER_BY_VALUE",
        Count => "COUNT",
        Align => "ALIGN",
        BucketTimestamp => "BUCKETTIMESTAMP",
        Empty => "EMPTY",
        WithLabels => "WITHLABELS",
        SelectedLabels => "SELECTED_LABELS",
        Filter => "FILTER",
        GroupBy => "GROUPBY",
        Reduce => "REDUCE",
        Debug => "DEBUG",
        Expansion => "EXPANSION",
        NonScaling => "NONSCALING",
        Capacity => "CAPACITY",
        Error => "ERROR",
        NoCreate => "NOCREATE",
        Items => "ITEMS",
        BucketSize => "BUCKETSIZE",
        MaxIterations => "MAXITERATIONS",
        Weights => "WEIGHTS",
        WithCount => "WITHCOUNT",
        Compression => "COMPRESSION",
        Override => "OVERRIDE",
        Nx => "NX",
        Xx => "XX",
        Indent => "INDENT",
        Newline => "NEWLINE",
        Space => "SPACE",
        Timeout => "TIMEOUT",
        Cypher => "CYPHER",
    }
}
